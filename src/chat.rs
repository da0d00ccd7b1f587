use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::models::{ChatMessage, ChatRole, Event};

pub const DEFAULT_MODEL: &str = "Qwen/Qwen2.5-72B-Instruct";
pub const MAX_TOKENS: u32 = 800;
pub const TEMPERATURE: f32 = 0.7;

/// Conversation with the analytics assistant. The first message is always
/// the system instruction built from the event snapshot.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

pub fn system_instruction(events: &[Event], today: NaiveDate) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string(events)?;
    Ok(format!(
        "You are Pixana AI, an analyst for the rolled-metal market. \
         Data to analyse: {data}. Today is {}. \
         Answer briefly and professionally, in Russian.",
        today.format("%d.%m.%Y")
    ))
}

impl Conversation {
    pub fn new(events: &[Event], today: NaiveDate) -> Result<Self, serde_json::Error> {
        let instruction = system_instruction(events, today)?;
        Ok(Self {
            messages: vec![ChatMessage::new(ChatRole::System, instruction)],
        })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(ChatRole::User, content));
    }

    pub fn record_reply(&mut self, content: impl Into<String>) {
        self.messages
            .push(ChatMessage::new(ChatRole::Assistant, content));
    }

    /// Drops the pending user message after a failed request so it can be
    /// sent again.
    pub fn rollback_last_user(&mut self) -> Option<ChatMessage> {
        match self.messages.last() {
            Some(message) if message.role == ChatRole::User => self.messages.pop(),
            _ => None,
        }
    }

    /// Starts over with a fresh instruction for the current snapshot.
    pub fn reset(&mut self, events: &[Event], today: NaiveDate) -> Result<(), serde_json::Error> {
        *self = Self::new(events, today)?;
        Ok(())
    }

    pub fn request<'a>(&'a self, model: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model,
            messages: &self.messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            stream: false,
        }
    }
}

/// Extracts the assistant text from an OpenAI-style completion response.
pub fn parse_reply(status: u16, body: &str) -> Result<String, ChatError> {
    if !(200..300).contains(&status) {
        return Err(ChatError::Http {
            status,
            body: body.chars().take(100).collect(),
        });
    }

    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .ok_or(ChatError::NoChoices)
}

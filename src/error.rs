use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid event cache: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("scraper command is empty")]
    EmptyCommand,

    #[error("failed to start scraper `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scraper timed out after {0:?}")]
    Timeout(Duration),

    #[error("scraper exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("scraper output exceeds {limit} bytes")]
    OutputTooLarge { limit: usize },

    #[error("scraper output is not JSON: {preview}")]
    NotJson { preview: String },

    #[error("scraper reported a failure: {0}")]
    Reported(String),

    #[error("scraper output is not an event list: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("chat service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("chat response has no choices")]
    NoChoices,

    #[error("chat response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ChatError {
    /// The hosted model answers 503 while it is still being loaded.
    pub fn is_model_loading(&self) -> bool {
        match self {
            ChatError::Http { status, body } => *status == 503 || body.contains("loading"),
            _ => false,
        }
    }
}

use serde_json::Value;
use tokio::process::Command;
use tracing::{info, warn};

use crate::cache;
use crate::config::ScraperSettings;
use crate::error::CollectorError;
use crate::models::{Event, RawEvent};

pub const MAX_OUTPUT_BYTES: usize = 5 * 1024 * 1000;
const PREVIEW_CHARS: usize = 200;

/// Runs the scraper once and returns the events it printed on stdout.
pub async fn collect(settings: &ScraperSettings) -> Result<Vec<Event>, CollectorError> {
    let mut parts = settings.command.split_whitespace();
    let program = parts.next().ok_or(CollectorError::EmptyCommand)?;

    info!(command = %settings.command, "starting scraper");

    let output = tokio::time::timeout(
        settings.timeout,
        Command::new(program).args(parts).kill_on_drop(true).output(),
    )
    .await
    .map_err(|_| CollectorError::Timeout(settings.timeout))?
    .map_err(|source| CollectorError::Spawn {
        command: settings.command.clone(),
        source,
    })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        return Err(CollectorError::Failed {
            status: output.status,
            stderr: stderr.trim().to_string(),
        });
    }

    for line in stderr.lines().map(str::trim).filter(|line| !line.is_empty()) {
        warn!(target: "pixana_dashboard::scraper", "{line}");
    }

    let events = parse_output(&output.stdout)?;
    info!(count = events.len(), "scraper finished");
    Ok(events)
}

pub fn parse_output(stdout: &[u8]) -> Result<Vec<Event>, CollectorError> {
    if stdout.len() > MAX_OUTPUT_BYTES {
        return Err(CollectorError::OutputTooLarge {
            limit: MAX_OUTPUT_BYTES,
        });
    }

    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();

    if !trimmed.starts_with('[') && !trimmed.starts_with('{') {
        return Err(CollectorError::NotJson {
            preview: trimmed.chars().take(PREVIEW_CHARS).collect(),
        });
    }

    let value: Value = serde_json::from_str(trimmed)?;

    if let Some(message) = value
        .as_object()
        .and_then(|object| object.get("message"))
        .and_then(Value::as_str)
    {
        return Err(CollectorError::Reported(message.to_string()));
    }

    let raw: Vec<RawEvent> = serde_json::from_value(value)?;
    Ok(cache::to_events(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parses_scraper_array() {
        let stdout = br#"
            [{"id": 0, "product": "Rebar 12mm", "company": "StalProm", "region": "Moscow",
              "volume": "Rebar 12mm", "event_date": "15.12.2025 14:36", "status": "potential",
              "confidence": 70, "source": "https://www.metal-trade.ru/buy/"}]
        "#;

        let events = parse_output(stdout).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, 0);
        assert_eq!(events[0].event_date, "15.12.2025 14:36");
    }

    #[test]
    fn empty_array_is_fine() {
        assert!(parse_output(b"[]\n").unwrap().is_empty());
    }

    #[test]
    fn rejects_plain_text() {
        let err = parse_output(b"Traceback (most recent call last):").unwrap_err();
        assert!(matches!(err, CollectorError::NotJson { preview } if preview.starts_with("Traceback")));
    }

    #[test]
    fn surfaces_reported_failures() {
        let err = parse_output(br#"{"success": false, "message": "parser crashed"}"#).unwrap_err();
        assert!(matches!(err, CollectorError::Reported(message) if message == "parser crashed"));
    }

    #[test]
    fn rejects_objects_that_are_not_event_lists() {
        let err = parse_output(br#"{"events": []}"#).unwrap_err();
        assert!(matches!(err, CollectorError::Malformed(_)));
    }

    #[test]
    fn rejects_oversized_output() {
        let stdout = vec![b' '; MAX_OUTPUT_BYTES + 1];
        assert!(matches!(
            parse_output(&stdout),
            Err(CollectorError::OutputTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn empty_command_is_an_error() {
        let settings = ScraperSettings {
            command: "   ".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(
            collect(&settings).await,
            Err(CollectorError::EmptyCommand)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_command_and_parses_stdout() {
        let settings = ScraperSettings {
            command: "echo []".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert!(collect(&settings).await.unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_a_failure() {
        let settings = ScraperSettings {
            command: "false".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert!(matches!(
            collect(&settings).await,
            Err(CollectorError::Failed { .. })
        ));
    }
}

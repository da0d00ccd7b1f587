use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::{Event, EventStatus};

pub const CONFIDENCE_LEVELS: [u8; 5] = [80, 85, 90, 95, 100];
pub const URGENT_THRESHOLD: u8 = 90;

/// How confidence is drawn when an event enters the live collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidenceMode {
    /// A fresh draw on every admission, including reloads from the cache.
    #[default]
    Random,
    /// A draw seeded by the event id, stable across reloads.
    Seeded,
}

impl FromStr for ConfidenceMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "random" => Ok(ConfidenceMode::Random),
            "seeded" => Ok(ConfidenceMode::Seeded),
            other => Err(format!("unknown confidence mode '{other}' (expected random or seeded)")),
        }
    }
}

pub fn status_for(confidence: u8) -> EventStatus {
    if confidence >= URGENT_THRESHOLD {
        EventStatus::Urgent
    } else {
        EventStatus::Potential
    }
}

/// Overwrites confidence and status with a draw from `rng`.
pub fn assign_with<R: Rng + ?Sized>(mut event: Event, rng: &mut R) -> Event {
    let confidence = *CONFIDENCE_LEVELS
        .choose(rng)
        .unwrap_or(&CONFIDENCE_LEVELS[0]);

    event.confidence = Some(confidence);
    event.status = status_for(confidence);
    event
}

pub fn assign(event: Event, mode: ConfidenceMode) -> Event {
    match mode {
        ConfidenceMode::Random => assign_with(event, &mut rand::thread_rng()),
        ConfidenceMode::Seeded => {
            let mut rng = StdRng::seed_from_u64(event.id);
            assign_with(event, &mut rng)
        }
    }
}

pub fn assign_all(events: Vec<Event>, mode: ConfidenceMode) -> Vec<Event> {
    events.into_iter().map(|event| assign(event, mode)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: u64) -> Event {
        Event {
            id,
            product: "Sheet steel".to_string(),
            company: "UralMashZavod".to_string(),
            region: "Yekaterinburg".to_string(),
            volume: "150 t".to_string(),
            intent: None,
            event_date: "08.01.2025 10:00".to_string(),
            status: EventStatus::Confirmed,
            confidence: Some(65),
            source: None,
        }
    }

    #[test]
    fn draws_only_allowed_levels_and_matching_status() {
        for id in 0..500 {
            let assigned = assign(event(id), ConfidenceMode::Random);
            let confidence = assigned.confidence.unwrap();
            assert!(CONFIDENCE_LEVELS.contains(&confidence));
            assert_eq!(
                assigned.status == EventStatus::Urgent,
                confidence >= URGENT_THRESHOLD
            );
        }
    }

    #[test]
    fn overwrites_prior_confidence_and_confirmed_status() {
        let assigned = assign(event(7), ConfidenceMode::Random);
        assert_ne!(assigned.confidence, Some(65));
        assert_ne!(assigned.status, EventStatus::Confirmed);
    }

    #[test]
    fn assigns_confidence_when_missing() {
        let mut raw = event(3);
        raw.confidence = None;
        assert!(assign(raw, ConfidenceMode::Random).confidence.is_some());
    }

    #[test]
    fn seeded_mode_is_stable_per_id() {
        for id in [1, 1532, 987_654_321] {
            let first = assign(event(id), ConfidenceMode::Seeded);
            let second = assign(event(id), ConfidenceMode::Seeded);
            assert_eq!(first.confidence, second.confidence);
            assert_eq!(first.status, second.status);
        }
    }

    #[test]
    fn leaves_descriptive_fields_alone() {
        let assigned = assign(event(11), ConfidenceMode::Seeded);
        assert_eq!(assigned.id, 11);
        assert_eq!(assigned.product, "Sheet steel");
        assert_eq!(assigned.event_date, "08.01.2025 10:00");
    }

    #[test]
    fn status_threshold() {
        assert_eq!(status_for(85), EventStatus::Potential);
        assert_eq!(status_for(90), EventStatus::Urgent);
        assert_eq!(status_for(100), EventStatus::Urgent);
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("random".parse::<ConfidenceMode>(), Ok(ConfidenceMode::Random));
        assert_eq!("Seeded".parse::<ConfidenceMode>(), Ok(ConfidenceMode::Seeded));
        assert!("sticky".parse::<ConfidenceMode>().is_err());
    }
}

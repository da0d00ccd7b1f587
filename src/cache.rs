use std::collections::HashSet;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CacheError;
use crate::models::{Event, EventStatus, RawEvent};

const GENERATED_ID_RANGE: Range<u64> = 1..1_000_000;

/// Adapts raw records to `Event`. Missing ids stay 0 until the batch is
/// admitted next to the held collection.
pub fn to_events(raw: Vec<RawEvent>) -> Vec<Event> {
    raw.into_iter().map(RawEvent::into_event).collect()
}

/// Adapts a standalone snapshot, filling in missing ids.
pub fn normalize(raw: Vec<RawEvent>) -> Vec<Event> {
    let mut events = to_events(raw);
    assign_missing_ids(&mut events, &HashSet::new());
    events
}

/// Gives every event with id 0 a random id that is neither in `reserved`
/// nor elsewhere in the batch.
pub fn assign_missing_ids(events: &mut [Event], reserved: &HashSet<u64>) {
    assign_ids_in(events, reserved, GENERATED_ID_RANGE);
}

fn assign_ids_in(events: &mut [Event], reserved: &HashSet<u64>, range: Range<u64>) {
    let mut used: HashSet<u64> = reserved
        .iter()
        .copied()
        .chain(events.iter().map(|event| event.id))
        .filter(|id| *id != 0)
        .collect();
    let mut rng = rand::thread_rng();

    for event in events.iter_mut().filter(|event| event.id == 0) {
        let free_in_range = range.clone().any(|id| !used.contains(&id));
        let candidate = if free_in_range {
            let mut candidate = rng.gen_range(range.clone());
            while used.contains(&candidate) {
                candidate = rng.gen_range(range.clone());
            }
            candidate
        } else {
            used.iter().max().copied().unwrap_or(0) + 1
        };

        used.insert(candidate);
        event.id = candidate;
    }
}

/// Reads the cache file. A missing file is a first run and yields no events.
pub fn load(path: &Path) -> Result<Vec<Event>, CacheError> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "cache file not found, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if data.trim().is_empty() {
        return Ok(Vec::new());
    }

    let raw: Vec<RawEvent> = serde_json::from_str(&data).map_err(|source| CacheError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(normalize(raw))
}

pub fn save(path: &Path, events: &[Event]) -> Result<(), CacheError> {
    let json = serde_json::to_string_pretty(events).map_err(|source| CacheError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::write(path, json).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), count = events.len(), "saved event cache");
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvEvent {
    #[serde(default)]
    id: Option<u64>,
    product: String,
    company: String,
    region: String,
    volume: String,
    event_date: String,
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    status: Option<EventStatus>,
    #[serde(default)]
    confidence: Option<u8>,
}

impl From<&Event> for CsvEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: Some(event.id),
            product: event.product.clone(),
            company: event.company.clone(),
            region: event.region.clone(),
            volume: event.volume.clone(),
            event_date: event.event_date.clone(),
            intent: event.intent.clone(),
            source: event.source.clone(),
            status: Some(event.status),
            confidence: event.confidence,
        }
    }
}

impl From<CsvEvent> for RawEvent {
    fn from(row: CsvEvent) -> Self {
        Self {
            id: row.id,
            product: row.product,
            company: row.company,
            region: row.region,
            volume: row.volume,
            intent: row.intent,
            event_date: row.event_date,
            status: row.status,
            confidence: row.confidence,
            source: row.source,
        }
    }
}

pub fn import_csv(path: &Path) -> Result<Vec<Event>, CacheError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut raw = Vec::new();

    for result in reader.deserialize::<CsvEvent>() {
        raw.push(RawEvent::from(result?));
    }

    Ok(to_events(raw))
}

pub fn export_csv(path: &Path, events: &[Event]) -> Result<usize, CacheError> {
    let mut writer = csv::Writer::from_path(path)?;

    for event in events {
        writer.serialize(CsvEvent::from(event))?;
    }

    writer.flush().map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(events.len())
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Urgent,
    Potential,
    Confirmed,
}

impl EventStatus {
    pub fn label(self) -> &'static str {
        match self {
            EventStatus::Urgent => "urgent",
            EventStatus::Potential => "potential",
            EventStatus::Confirmed => "confirmed",
        }
    }
}

/// One prospective deal as held in the live collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub product: String,
    pub company: String,
    pub region: String,
    pub volume: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// `DD.MM.YYYY HH:MM`, or ISO-8601 for older cache entries.
    pub event_date: String,
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Record shape as it arrives from the cache file or the scraper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default, alias = "date")]
    pub event_date: String,
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub confidence: Option<u8>,
    #[serde(default)]
    pub source: Option<String>,
}

impl RawEvent {
    /// Maps the raw shape onto `Event`. A missing id becomes 0 and must be
    /// replaced before the event reaches the merge engine.
    pub fn into_event(self) -> Event {
        Event {
            id: self.id.unwrap_or(0),
            product: self.product,
            company: self.company,
            region: self.region,
            volume: self.volume,
            intent: self.intent,
            event_date: self.event_date,
            status: self.status.unwrap_or(EventStatus::Potential),
            confidence: self.confidence,
            source: self.source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub label: &'static str,
    pub date_key: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    OrdersInWork,
    UrgentSignals,
    TotalBase,
}

impl MetricKey {
    pub const ALL: [MetricKey; 3] = [
        MetricKey::OrdersInWork,
        MetricKey::UrgentSignals,
        MetricKey::TotalBase,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::OrdersInWork => "orders_in_work",
            MetricKey::UrgentSignals => "urgent_signals",
            MetricKey::TotalBase => "total_base",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MetricKey::OrdersInWork => "Orders in work",
            MetricKey::UrgentSignals => "Urgent deals",
            MetricKey::TotalBase => "Total base (units)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub key: MetricKey,
    pub title: String,
    pub value: usize,
    /// Percent change against the previous value of this metric.
    pub change: f64,
    pub trend: Trend,
}

impl Metric {
    pub fn new(key: MetricKey, value: usize) -> Self {
        Self {
            key,
            title: key.title().to_string(),
            value,
            change: 0.0,
            trend: Trend::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSet {
    pub metrics: Vec<Metric>,
}

impl MetricSet {
    pub fn get(&self, key: MetricKey) -> Option<&Metric> {
        self.metrics.iter().find(|metric| metric.key == key)
    }

    pub fn value(&self, key: MetricKey) -> usize {
        self.get(key).map(|metric| metric.value).unwrap_or(0)
    }
}

impl Default for MetricSet {
    fn default() -> Self {
        Self {
            metrics: MetricKey::ALL
                .iter()
                .map(|key| Metric::new(*key, 0))
                .collect(),
        }
    }
}

/// Side-channel update pushed after a collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardUpdate {
    pub new_orders: Option<usize>,
    pub total_parsed: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct RegionSummary {
    pub region: String,
    pub count: usize,
    pub avg_confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    #[serde(skip)]
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    #[serde(skip)]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

use crate::models::{Event, EventStatus, Metric, MetricKey, MetricSet, Trend};
use crate::scoring::URGENT_THRESHOLD;

/// The only two ways a metric value changes.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricUpdate {
    Recomputed(MetricSet),
    Override { key: MetricKey, value: usize },
}

fn in_work(status: EventStatus) -> bool {
    matches!(
        status,
        EventStatus::Urgent | EventStatus::Confirmed | EventStatus::Potential
    )
}

/// Full scan of the collection. `change` and `trend` are left neutral; the
/// reducer fills them in against the previous values.
pub fn recompute(events: &[Event]) -> MetricSet {
    let total_base = events.len();
    let orders_in_work = events.iter().filter(|event| in_work(event.status)).count();
    let urgent_signals = events
        .iter()
        .filter(|event| matches!(event.confidence, Some(confidence) if confidence >= URGENT_THRESHOLD))
        .count();

    MetricSet {
        metrics: vec![
            Metric::new(MetricKey::OrdersInWork, orders_in_work),
            Metric::new(MetricKey::UrgentSignals, urgent_signals),
            Metric::new(MetricKey::TotalBase, total_base),
        ],
    }
}

/// Applies an update to `current`, keyed per metric. Keys the update does not
/// mention keep their last value.
pub fn reduce(current: &MetricSet, update: &MetricUpdate) -> MetricSet {
    let mut next = current.clone();

    match update {
        MetricUpdate::Recomputed(fresh) => {
            for metric in &fresh.metrics {
                set_value(&mut next, metric.key, metric.value);
            }
        }
        MetricUpdate::Override { key, value } => set_value(&mut next, *key, *value),
    }

    next
}

fn set_value(set: &mut MetricSet, key: MetricKey, value: usize) {
    match set.metrics.iter_mut().find(|metric| metric.key == key) {
        Some(metric) => {
            let change = percent_change(metric.value, value);
            metric.value = value;
            metric.change = change;
            metric.trend = trend_for(change);
        }
        None => set.metrics.push(Metric::new(key, value)),
    }
}

pub fn percent_change(previous: usize, next: usize) -> f64 {
    if previous == 0 {
        return if next == 0 { 0.0 } else { 100.0 };
    }

    let change = (next as f64 - previous as f64) / previous as f64 * 100.0;
    (change * 10.0).round() / 10.0
}

fn trend_for(change: f64) -> Trend {
    if change > 0.0 {
        Trend::Up
    } else if change < 0.0 {
        Trend::Down
    } else {
        Trend::Neutral
    }
}

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::cache;
use crate::dates::WeekWindow;
use crate::merge;
use crate::metrics::{self, MetricUpdate};
use crate::models::{DashboardUpdate, DayBucket, Event, MetricKey, MetricSet};
use crate::scoring::{self, ConfidenceMode};
use crate::trend;

pub const DASHBOARD_EVENT_LIMIT: usize = 50;
pub const HOT_EVENT_COUNT: usize = 2;

/// Identifies one in-flight collection run. Only the most recently started
/// run may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionTicket(u64);

/// Current-value slot for the dashboard. Every transition replaces the event
/// collection and metric set wholesale.
#[derive(Debug, Clone)]
pub struct DashboardState {
    events: Vec<Event>,
    metrics: MetricSet,
    week_offset: i32,
    mode: ConfidenceMode,
    last_ticket: u64,
    pending: Option<u64>,
}

impl DashboardState {
    pub fn new(mode: ConfidenceMode) -> Self {
        Self {
            events: Vec::new(),
            metrics: MetricSet::default(),
            week_offset: 0,
            mode,
            last_ticket: 0,
            pending: None,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    /// Installs the startup snapshot. An empty snapshot leaves the state as is.
    pub fn load_snapshot(&mut self, cached: Vec<Event>) -> usize {
        if cached.is_empty() {
            debug!("cache snapshot is empty");
            return 0;
        }

        self.events = scoring::assign_all(cached, self.mode);
        // A snapshot has no prior value to compare with, so trends start neutral.
        self.metrics = metrics::recompute(&self.events);
        info!(count = self.events.len(), "loaded events from cache");
        self.events.len()
    }

    pub fn begin_collection(&mut self) -> CollectionTicket {
        self.last_ticket += 1;
        if let Some(previous) = self.pending.replace(self.last_ticket) {
            debug!(ticket = previous, "abandoning earlier collection run");
        }
        CollectionTicket(self.last_ticket)
    }

    /// Applies a finished collection run. Returns false when the run was
    /// superseded by a newer one and its result was dropped.
    pub fn apply_collected(&mut self, ticket: CollectionTicket, incoming: Vec<Event>) -> bool {
        if self.pending != Some(ticket.0) {
            warn!(
                ticket = ticket.0,
                discarded = incoming.len(),
                "ignoring result of a stale collection run"
            );
            return false;
        }

        self.pending = None;
        self.merge_incoming(incoming);
        true
    }

    pub fn merge_incoming(&mut self, mut incoming: Vec<Event>) {
        let added = incoming.len();
        let held: HashSet<u64> = self.events.iter().map(|event| event.id).collect();
        cache::assign_missing_ids(&mut incoming, &held);
        self.events = merge::merge_events(incoming, &self.events, self.mode);
        self.recalculate();
        info!(added, total = self.events.len(), "merged collected events");
    }

    fn recalculate(&mut self) {
        let fresh = metrics::recompute(&self.events);
        debug!(
            urgent_signals = fresh.value(MetricKey::UrgentSignals),
            "recalculated metrics"
        );
        self.apply_metric_update(MetricUpdate::Recomputed(fresh));
    }

    /// The single write path for metric values.
    pub fn apply_metric_update(&mut self, update: MetricUpdate) {
        if let MetricUpdate::Override { key, value } = &update {
            let derived = self.metrics.value(*key);
            if *value != derived {
                warn!(
                    metric = key.as_str(),
                    derived,
                    value,
                    "override replaces the recomputed value until the next recompute"
                );
            }
        }

        self.metrics = metrics::reduce(&self.metrics, &update);
    }

    /// `new_orders` is informational and does not feed any metric.
    pub fn apply_dashboard_update(&mut self, update: &DashboardUpdate) {
        if let Some(total_parsed) = update.total_parsed {
            self.apply_metric_update(MetricUpdate::Override {
                key: MetricKey::TotalBase,
                value: total_parsed,
            });
        }
        debug!(?update, "applied dashboard update");
    }

    pub fn week_offset(&self) -> i32 {
        self.week_offset
    }

    /// Future weeks are never shown, so positive offsets clamp to the current week.
    pub fn set_week_offset(&mut self, offset: i32) {
        self.week_offset = offset.min(0);
    }

    pub fn previous_week(&mut self) {
        self.week_offset = self.week_offset.saturating_sub(1);
    }

    pub fn next_week(&mut self) -> bool {
        if self.week_offset < 0 {
            self.week_offset += 1;
            true
        } else {
            false
        }
    }

    pub fn week_window(&self) -> WeekWindow {
        WeekWindow::current(self.week_offset)
    }

    pub fn week_window_at(&self, today: NaiveDate) -> WeekWindow {
        WeekWindow::at(today, self.week_offset)
    }

    /// Demand trend for the selected week, over the dashboard slice.
    pub fn trend(&self) -> Vec<DayBucket> {
        trend::aggregate_window(self.dashboard_events(), &self.week_window())
    }

    pub fn trend_at(&self, today: NaiveDate) -> Vec<DayBucket> {
        trend::aggregate_window(self.dashboard_events(), &self.week_window_at(today))
    }

    pub fn dashboard_events(&self) -> &[Event] {
        &self.events[..self.events.len().min(DASHBOARD_EVENT_LIMIT)]
    }

    pub fn hot_events(&self) -> &[Event] {
        &self.events[..self.events.len().min(HOT_EVENT_COUNT)]
    }

    /// Case-insensitive substring match on product or company.
    pub fn filter_events(&self, query: &str) -> Vec<&Event> {
        let needle = query.to_lowercase();
        self.events
            .iter()
            .filter(|event| {
                event.product.to_lowercase().contains(&needle)
                    || event.company.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

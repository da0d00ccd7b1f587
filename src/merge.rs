use std::collections::HashSet;

use crate::models::Event;
use crate::scoring::{self, ConfidenceMode};

/// Folds a freshly collected batch into the held collection.
///
/// Incoming events are scored, placed first in their given order, and
/// supersede any held event with the same id. Inputs are left untouched;
/// the caller swaps in the returned collection. A batch that repeats an id
/// keeps only its first occurrence.
pub fn merge_events(incoming: Vec<Event>, existing: &[Event], mode: ConfidenceMode) -> Vec<Event> {
    let mut incoming_ids: HashSet<u64> = HashSet::with_capacity(incoming.len());
    let assigned: Vec<Event> = scoring::assign_all(incoming, mode)
        .into_iter()
        .filter(|event| incoming_ids.insert(event.id))
        .collect();

    let mut merged = Vec::with_capacity(assigned.len() + existing.len());
    merged.extend(assigned);
    merged.extend(
        existing
            .iter()
            .filter(|event| !incoming_ids.contains(&event.id))
            .cloned(),
    );

    merged
}

//! Event deduplication
//!
//! The same event can appear verbatim in more than one overlapping log
//! file. Collapse the batch to one occurrence per logical id. Output keeps
//! first-occurrence order; the last-seen payload wins, which is safe
//! because duplicates are byte-identical copies of the same source event.
//! Ordering by timestamp is applied downstream by the partitioner.

use std::collections::HashMap;

use crate::core::types::UsageEvent;

pub(crate) fn dedupe(events: Vec<UsageEvent>) -> Vec<UsageEvent> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(events.len());
    let mut unique: Vec<UsageEvent> = Vec::with_capacity(events.len());

    for event in events {
        match slots.get(&event.id) {
            Some(&slot) => unique[slot] = event,
            None => {
                slots.insert(event.id.clone(), unique.len());
                unique.push(event);
            }
        }
    }

    unique
}

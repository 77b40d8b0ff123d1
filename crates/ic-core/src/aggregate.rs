//! Single-pass classification and tallying of calendar events.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::category::CategoryLabel;
use crate::event::{CalendarEvent, effective_creators};
use crate::rules::classify;

/// A `(title, label)` pair, one per input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedEvent {
    pub title: String,
    pub label: CategoryLabel,
}

/// Result of aggregating a batch of events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Events per label, seeded with every label at zero.
    pub counts: BTreeMap<CategoryLabel, usize>,

    /// One entry per event, in input order.
    pub classified: Vec<ClassifiedEvent>,

    /// Sparse creator → label → count table.
    ///
    /// Multi-creator events add one to each creator's tally.
    pub creator_counts: HashMap<String, HashMap<CategoryLabel, usize>>,
}

impl Aggregation {
    /// Count for a label.
    pub fn count(&self, label: CategoryLabel) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Count for a creator and label, zero if the creator never hit it.
    pub fn creator_count(&self, creator: &str, label: CategoryLabel) -> usize {
        self.creator_counts
            .get(creator)
            .and_then(|by_label| by_label.get(&label))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of events aggregated.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Classifies each event once and tallies the results.
pub fn aggregate<E: CalendarEvent>(events: &[E]) -> Aggregation {
    let mut counts: BTreeMap<CategoryLabel, usize> =
        CategoryLabel::ALL.into_iter().map(|l| (l, 0)).collect();
    let mut classified = Vec::with_capacity(events.len());
    let mut creator_counts: HashMap<String, HashMap<CategoryLabel, usize>> = HashMap::new();

    for event in events {
        let title = event.title().unwrap_or_default();
        let label = classify(Some(title));
        tracing::debug!(title, label = %label, "classified event");

        *counts.entry(label).or_insert(0) += 1;
        classified.push(ClassifiedEvent {
            title: title.to_string(),
            label,
        });

        for creator in effective_creators(event) {
            *creator_counts
                .entry(creator.to_string())
                .or_default()
                .entry(label)
                .or_insert(0) += 1;
        }
    }

    Aggregation {
        counts,
        classified,
        creator_counts,
    }
}

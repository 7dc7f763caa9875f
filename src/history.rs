//! Per-language popularity time series built from stored snapshots.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::popularity::Snapshot;

/// Struct representing the recorded popularity of one language over time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageHistory {
    pub name: String,
    /// `(day_id, popularity)` pairs, oldest first
    pub records: Vec<(i64, f64)>,
}

impl LanguageHistory {
    pub fn new(name: impl Into<String>) -> Self {
        LanguageHistory {
            name: name.into(),
            records: Vec::new(),
        }
    }

    pub fn add_record(&mut self, day_id: i64, popularity: f64) {
        self.records.push((day_id, popularity));
    }

    /// Popularity on a given day, if recorded
    pub fn on(&self, day_id: i64) -> Option<f64> {
        self.records
            .iter()
            .find(|(day, _)| *day == day_id)
            .map(|(_, popularity)| *popularity)
    }

    /// Most recently recorded popularity
    pub fn last(&self) -> f64 {
        self.records.last().map_or(0.0, |(_, popularity)| *popularity)
    }

    /// Whether the language ever reached `threshold`
    pub fn has_been_popular(&self, threshold: f64) -> bool {
        self.records.iter().any(|(_, p)| *p >= threshold)
    }
}

/// Builds one history per language appearing in any snapshot
///
/// Snapshots are expected oldest first, as returned by the store.
pub fn build_histories(snapshots: &[Snapshot]) -> Vec<LanguageHistory> {
    let mut by_name: BTreeMap<&str, LanguageHistory> = BTreeMap::new();
    for snapshot in snapshots {
        for (name, popularity) in &snapshot.scores {
            by_name
                .entry(name.as_str())
                .or_insert_with(|| LanguageHistory::new(name.as_str()))
                .add_record(snapshot.day_id, *popularity);
        }
    }
    by_name.into_values().collect()
}

/// Orders histories by last recorded popularity, highest first; ties by name
pub fn rank_by_latest(histories: &mut [LanguageHistory]) {
    histories.sort_by(|a, b| {
        b.last()
            .total_cmp(&a.last())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Picks the languages to plot from a ranked list
///
/// Walks the ranking and stops at the first language that never reached `threshold`.
pub fn select_for_plot(ranked: &[LanguageHistory], threshold: f64) -> Vec<&LanguageHistory> {
    ranked
        .iter()
        .take_while(|h| h.has_been_popular(threshold))
        .collect()
}

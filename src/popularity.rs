//! Normalization of raw catalog counts into 0-100 popularity scores.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::LanguageCount;
use crate::clustering::Item;

/// Minimum popularity for a language to be stored
pub const DB_THRESHOLD: f64 = 0.45;

/// Minimum popularity a language must have reached at some point to be plotted
pub const PLOT_THRESHOLD: f64 = 10.0;

/// Popularity of one language relative to the most popular one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub name: String,
    pub popularity: f64,
}

/// Struct representing the stored popularity of every language on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub day_id: i64,
    pub scores: BTreeMap<String, f64>,
}

impl Snapshot {
    pub fn new(day_id: i64, scores: &[Score]) -> Self {
        Snapshot {
            day_id,
            scores: scores
                .iter()
                .map(|s| (s.name.clone(), s.popularity))
                .collect(),
        }
    }

    /// The snapshot as clustering items, most popular first
    pub fn items(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .scores
            .iter()
            .map(|(name, popularity)| Item::scored(name.clone(), *popularity))
            .collect();
        items.sort_by(|a, b| b.primary().total_cmp(&a.primary()));
        items
    }
}

/// Scales counts so the top language scores 100
///
/// Counts must be ordered highest first. The walk stops at the first language
/// whose score falls below `threshold`.
///
/// # Arguments
/// * `counts` - Per-language totals, highest first
/// * `threshold` - Minimum score to keep
///
/// # Returns
/// * `Vec<Score>` - Kept languages in input order; empty if there is nothing to scale
pub fn normalize(counts: &[LanguageCount], threshold: f64) -> Vec<Score> {
    let top = match counts.first() {
        Some(top) if top.count > 0 => top.count,
        _ => return Vec::new(),
    };
    let unit = 100.0 / top as f64;

    counts
        .iter()
        .map(|c| Score {
            name: c.name.clone(),
            popularity: c.count as f64 * unit,
        })
        .take_while(|s| s.popularity >= threshold)
        .collect()
}

/// Clustering items for a list of scores
pub fn to_items(scores: &[Score]) -> Vec<Item> {
    scores
        .iter()
        .map(|s| Item::scored(s.name.clone(), s.popularity))
        .collect()
}

/// Unique id for a day, e.g. `20131107`
pub fn day_id(date: NaiveDate) -> i64 {
    date.year() as i64 * 10000 + date.month() as i64 * 100 + date.day() as i64
}

/// The day id of the local current date
pub fn today_id() -> i64 {
    day_id(Local::now().date_naive())
}

/// Inverse of [`day_id`]; `None` if the id is not a calendar date
pub fn date_from_id(day_id: i64) -> Option<NaiveDate> {
    let year = i32::try_from(day_id / 10000).ok()?;
    let month = u32::try_from(day_id / 100 % 100).ok()?;
    let day = u32::try_from(day_id % 100).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> Vec<LanguageCount> {
        pairs
            .iter()
            .map(|(name, count)| LanguageCount {
                name: name.to_string(),
                count: *count,
            })
            .collect()
    }

    #[test]
    fn test_normalize_to_top_language() {
        let scores = normalize(&counts(&[("Java", 400), ("C", 200), ("Lisp", 2)]), 0.45);
        assert_eq!(
            scores,
            vec![
                Score { name: "Java".to_string(), popularity: 100.0 },
                Score { name: "C".to_string(), popularity: 50.0 },
                Score { name: "Lisp".to_string(), popularity: 0.5 },
            ]
        );
    }

    #[test]
    fn test_normalize_stops_below_threshold() {
        let scores = normalize(
            &counts(&[("Java", 10000), ("C", 50), ("Lisp", 44), ("Go", 40)]),
            DB_THRESHOLD,
        );
        let names: Vec<&str> = scores.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Java", "C"]);
    }

    #[test]
    fn test_normalize_nothing_to_scale() {
        assert!(normalize(&[], DB_THRESHOLD).is_empty());
        assert!(normalize(&counts(&[("Java", 0)]), DB_THRESHOLD).is_empty());
    }

    #[test]
    fn test_day_ids() {
        let date = NaiveDate::from_ymd_opt(2013, 11, 7).unwrap();
        assert_eq!(day_id(date), 20131107);
        assert_eq!(date_from_id(20131107), Some(date));
        assert_eq!(date_from_id(20131340), None);
    }

    #[test]
    fn test_snapshot_items_most_popular_first() {
        let scores = vec![
            Score { name: "C".to_string(), popularity: 40.0 },
            Score { name: "Java".to_string(), popularity: 100.0 },
        ];
        let snapshot = Snapshot::new(20131107, &scores);
        let items = snapshot.items();
        assert_eq!(items[0], Item::scored("Java", 100.0));
        assert_eq!(items[1], Item::scored("C", 40.0));
        assert_eq!(to_items(&scores)[0], Item::scored("C", 40.0));
    }
}

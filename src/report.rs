//! Plain-text rendering of rankings and tiers for the console and email.

use crate::clustering::Clustering;
use crate::popularity::Score;

/// One line per language: position, popularity, name
pub fn format_ranking(scores: &[Score]) -> String {
    scores
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{:2}) {:.2} - {}\n", i + 1, s.popularity, s.name))
        .collect()
}

/// One line per tier, most popular first
pub fn format_tiers(clustering: &Clustering) -> String {
    let mut out = String::from("Popularity Clusters:\n");
    for cluster in &clustering.clusters {
        out.push_str(&cluster.to_string());
        out.push('\n');
    }
    out
}

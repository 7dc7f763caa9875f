use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule for measuring the distance between two groups from their members' distances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Mean of all cross-group member distances
    #[default]
    Average,
    /// Largest cross-group member distance
    Complete,
    /// Smallest cross-group member distance
    Single,
}

impl Linkage {
    /// Lance-Williams update: distance from a third group `k` to the union of `i` and `j`.
    ///
    /// # Arguments
    /// * `d_ki` - Distance from `k` to `i`
    /// * `d_kj` - Distance from `k` to `j`
    /// * `n_i` - Number of members in `i`
    /// * `n_j` - Number of members in `j`
    pub fn combine(self, d_ki: f64, d_kj: f64, n_i: usize, n_j: usize) -> f64 {
        match self {
            Linkage::Average => {
                (n_i as f64 * d_ki + n_j as f64 * d_kj) / (n_i + n_j) as f64
            }
            Linkage::Complete => d_ki.max(d_kj),
            Linkage::Single => d_ki.min(d_kj),
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Linkage::Average => "average",
            Linkage::Complete => "complete",
            Linkage::Single => "single",
        };
        f.write_str(name)
    }
}

impl FromStr for Linkage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "average" => Ok(Linkage::Average),
            "complete" => Ok(Linkage::Complete),
            "single" => Ok(Linkage::Single),
            other => Err(format!("unknown linkage: {}", other)),
        }
    }
}

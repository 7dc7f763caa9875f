use serde::{Deserialize, Serialize};
use std::fmt;

/// Struct representing a named point to be grouped into a tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub features: Vec<f64>,
}

impl Item {
    pub fn new(name: impl Into<String>, features: impl Into<Vec<f64>>) -> Self {
        Item {
            name: name.into(),
            features: features.into(),
        }
    }

    /// Creates a one-dimensional item carrying a single popularity score
    pub fn scored(name: impl Into<String>, score: f64) -> Self {
        Item::new(name, vec![score])
    }

    /// The first feature, used to rank the cluster an item ends up in
    pub fn primary(&self) -> f64 {
        self.features.first().copied().unwrap_or_default()
    }

    /// Euclidean distance between the feature vectors of two items
    pub fn distance(&self, other: &Item) -> f64 {
        self.features
            .iter()
            .zip(other.features.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

/// Struct representing a ranked but not yet labeled group of items
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub members: Vec<Item>,
    pub score: f64,
}

/// Struct representing a labeled popularity tier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub label: String,
    pub score: f64,
    pub members: Vec<Item>,
}

impl Cluster {
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2}): {}",
            self.label,
            self.score,
            self.names().join(", ")
        )
    }
}

/// One agglomeration step: the two groups that were joined and how far apart they were
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeStep {
    /// Member names of the group holding the smallest name of the pair
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub distance: f64,
}

/// Ranked groups together with the merges that produced them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouping {
    pub groups: Vec<Group>,
    pub merges: Vec<MergeStep>,
}

/// Struct representing the labeled output of a clustering run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
    pub merges: Vec<MergeStep>,
}

impl Clustering {
    /// Returns the tier a given item was placed in
    pub fn tier_of(&self, name: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.contains(name))
    }
}

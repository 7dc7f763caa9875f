//! Popularity tier clustering.
//!
//! Groups scored items into a fixed number of ordered, labeled tiers using
//! agglomerative hierarchical clustering.

// Module declarations
pub mod agglomerative;
pub mod error;
pub mod linkage;
pub mod types;

pub use agglomerative::{assign_labels, find_clusters, Agglomerative};
pub use error::ClusterError;
pub use linkage::Linkage;
pub use types::*;

/// Tier names used by the daily job, most popular first
pub const DEFAULT_TIER_LABELS: [&str; 4] = ["Ubiquitous", "Very Popular", "Popular", "Niche"];

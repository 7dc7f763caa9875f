//! Error types for tier clustering.

use thiserror::Error;

/// Errors returned by the clustering engine before it produces any output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// No items were supplied.
    #[error("cannot cluster an empty item set")]
    EmptyInput,

    /// Zero tiers were requested.
    #[error("label count must be at least 1, got {0}")]
    InvalidLabelCount(usize),

    /// More groups were produced than labels supplied. Indicates a logic bug.
    #[error("{clusters} clusters to label but only {labels} labels supplied")]
    LabelMismatch { clusters: usize, labels: usize },

    /// Two items share a name.
    #[error("duplicate item name: {0}")]
    DuplicateName(String),

    /// An item's feature vector is empty or differs in length from the first item's.
    #[error("item {name} has {actual} features, expected {expected}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// An item carries a NaN or infinite feature.
    #[error("item {name} has a non-finite feature")]
    NonFiniteFeature { name: String },
}

//! Error types for clustering operations

use thiserror::Error;

/// Precondition failures raised by the clustering core.
///
/// Every variant is detected before any state is touched, so a failed call
/// leaves the caller's session exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KMeansError {
    /// The number of clusters must be at least 1.
    #[error("Number of clusters must be at least 1, got {k}")]
    InvalidK { k: usize },

    /// A step was requested while the centroid set does not hold exactly k centroids.
    #[error("Expected {expected} centroids, found {found}")]
    CentroidCountMismatch { expected: usize, found: usize },

    /// An operation that needs at least one point received none.
    #[error("Cannot operate on an empty set of points")]
    EmptyInput,
}

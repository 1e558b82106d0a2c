//! kmeans-stepper: incremental K-Means clustering of 2-D points
//!
//! The engine exposes single Assign + Update steps over an explicit,
//! caller-owned [`Session`], a cancellable run-to-convergence iterator, and
//! four centroid initialization strategies (Random, Farthest-First, KMeans++
//! and Manual). Every random draw goes through an injectable [`RandomSource`].

pub mod cli;
pub mod data;
pub mod error;
pub mod geometry;
pub mod init;
pub mod model;
pub mod random;
pub mod runner;
pub mod session;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{generate_points, load_points_csv, DataConfig, Dataset};
pub use error::KMeansError;
pub use geometry::{distance, mean, squared_distance, Point};
pub use init::{initialize, InitStrategy};
pub use model::{assign, cluster_sizes, inertia, nearest_centroid, step, StepResult};
pub use random::{seeded, RandomSource};
pub use runner::{CancelToken, Run, RunOutcome};
pub use session::{EngineState, Session};
pub use viz::generate_visualization_report;

/// Common result type used by the host-facing parts of the crate
pub type Result<T> = anyhow::Result<T>;

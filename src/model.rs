//! Clustering engine: one Assign + Update step, plus clustering metrics
//!
//! The engine holds no state of its own. Everything it needs arrives as
//! arguments, and it returns fresh assignment and centroid values, so a
//! single step and a full run go through exactly the same code.

use crate::data::Dataset;
use crate::error::KMeansError;
use crate::geometry::{distance, mean, squared_distance, Point};
use crate::random::RandomSource;
use tracing::{debug, warn};

/// Outcome of one clustering step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Cluster index for every dataset point, parallel to the dataset
    pub assignment: Vec<usize>,
    /// Centroids after the Update phase; unchanged when `changed` is false
    pub centroids: Vec<Point>,
    /// Whether the assignment differs from the previous one
    pub changed: bool,
}

/// Index of the centroid nearest to `point`
///
/// Scans in centroid order with a strict comparison, so the earliest centroid
/// keeps a point on exact ties. `None` for an empty centroid set.
pub fn nearest_centroid(point: &Point, centroids: &[Point]) -> Option<usize> {
    let mut min_distance = f64::INFINITY;
    let mut closest = None;

    for (idx, centroid) in centroids.iter().enumerate() {
        let d = distance(point, centroid);
        if closest.is_none() || d < min_distance {
            min_distance = d;
            closest = Some(idx);
        }
    }

    closest
}

/// Assign every dataset point to its nearest centroid
///
/// `centroids` must be non-empty.
pub fn assign(dataset: &Dataset, centroids: &[Point]) -> Vec<usize> {
    dataset
        .points()
        .iter()
        .map(|p| nearest_centroid(p, centroids).unwrap_or(0))
        .collect()
}

/// Perform one Assign + Update step
///
/// # Arguments
/// * `dataset` - Points being clustered
/// * `k` - Number of clusters
/// * `centroids` - Current centroid set; must hold exactly `k` centroids
/// * `previous` - Assignment from the previous step, `None` before the first step
/// * `rng` - Used only to reseed clusters left empty by the Assign phase
///
/// # Returns
/// * New assignment, new centroids, and whether the assignment changed
pub fn step<R: RandomSource + ?Sized>(
    dataset: &Dataset,
    k: usize,
    centroids: &[Point],
    previous: Option<&[usize]>,
    rng: &mut R,
) -> Result<StepResult, KMeansError> {
    if k < 1 {
        return Err(KMeansError::InvalidK { k });
    }
    if centroids.len() != k {
        return Err(KMeansError::CentroidCountMismatch {
            expected: k,
            found: centroids.len(),
        });
    }

    let assignment = assign(dataset, centroids);

    let changed = match previous {
        Some(previous) => previous != assignment.as_slice(),
        None => true,
    };

    if !changed {
        debug!("assignment stable, converged");
        return Ok(StepResult {
            assignment,
            centroids: centroids.to_vec(),
            changed,
        });
    }

    let mut members: Vec<Vec<Point>> = vec![Vec::new(); k];
    for (point, &cluster) in dataset.points().iter().zip(&assignment) {
        members[cluster].push(*point);
    }

    let mut new_centroids = Vec::with_capacity(k);
    for (cluster, points) in members.iter().enumerate() {
        let centroid = if points.is_empty() {
            let reseeded = dataset.sample(rng);
            warn!(cluster, centroid = %reseeded, "empty cluster reseeded");
            reseeded
        } else {
            mean(points)?
        };
        new_centroids.push(centroid);
    }

    debug!(
        sizes = ?cluster_sizes(&assignment, k),
        "step updated centroids"
    );

    Ok(StepResult {
        assignment,
        centroids: new_centroids,
        changed,
    })
}

/// Within-cluster sum of squared distances (inertia)
///
/// Points whose label has no centroid are skipped.
pub fn inertia(dataset: &Dataset, centroids: &[Point], assignment: &[usize]) -> f64 {
    dataset
        .points()
        .iter()
        .zip(assignment)
        .filter_map(|(point, &cluster)| {
            centroids
                .get(cluster)
                .map(|centroid| squared_distance(point, centroid))
        })
        .sum()
}

/// Number of points in each of the `k` clusters
pub fn cluster_sizes(assignment: &[usize], k: usize) -> Vec<usize> {
    let mut sizes = vec![0; k];
    for &label in assignment {
        if label < k {
            sizes[label] += 1;
        }
    }
    sizes
}

/// Mean silhouette coefficient over the first `sample_size` points
///
/// Only the sampled points take part, both as subjects and as neighbours.
pub fn silhouette_sample(
    dataset: &Dataset,
    assignment: &[usize],
    k: usize,
    sample_size: usize,
) -> f64 {
    let n_samples = dataset.len().min(assignment.len()).min(sample_size);
    if n_samples < 2 {
        return 0.0;
    }

    let points = dataset.points();
    let mut silhouette_sum = 0.0;

    for i in 0..n_samples {
        let label = assignment[i];

        // Mean distance to the rest of the own cluster (a) and to each other cluster
        let mut same_cluster = (0.0, 0usize);
        let mut other_clusters = vec![(0.0, 0usize); k];

        for j in 0..n_samples {
            if i == j {
                continue;
            }

            let d = distance(&points[i], &points[j]);
            let other_label = assignment[j];

            if other_label == label {
                same_cluster.0 += d;
                same_cluster.1 += 1;
            } else if other_label < k {
                other_clusters[other_label].0 += d;
                other_clusters[other_label].1 += 1;
            }
        }

        let a_i = if same_cluster.1 == 0 {
            0.0
        } else {
            same_cluster.0 / same_cluster.1 as f64
        };

        let b_i = other_clusters
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(sum, count)| sum / *count as f64)
            .fold(f64::INFINITY, f64::min);

        let silhouette_i = if b_i.is_infinite() || (a_i == 0.0 && b_i == 0.0) {
            0.0
        } else {
            (b_i - a_i) / a_i.max(b_i)
        };

        silhouette_sum += silhouette_i;
    }

    silhouette_sum / n_samples as f64
}

//! Centroid initialization strategies

use crate::data::Dataset;
use crate::error::KMeansError;
use crate::geometry::{distance, Point};
use crate::random::RandomSource;
use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// How the initial centroid set is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InitStrategy {
    /// k uniform draws from the dataset, with replacement
    #[default]
    Random,
    /// Greedy max-min selection after one random seed point
    FarthestFirst,
    /// Squared-distance weighted sampling after one random seed point
    #[value(name = "kmeans++")]
    KMeansPlusPlus,
    /// Centroids are placed one at a time by the caller
    Manual,
}

impl InitStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitStrategy::Random => "random",
            InitStrategy::FarthestFirst => "farthest-first",
            InitStrategy::KMeansPlusPlus => "kmeans++",
            InitStrategy::Manual => "manual",
        }
    }
}

impl fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(InitStrategy::Random),
            "farthest-first" | "farthest_first" | "farthest first" => {
                Ok(InitStrategy::FarthestFirst)
            }
            "kmeans++" | "kmeans-plus-plus" | "kmeanspp" => Ok(InitStrategy::KMeansPlusPlus),
            "manual" => Ok(InitStrategy::Manual),
            other => anyhow::bail!("Unknown initialization strategy: {}", other),
        }
    }
}

/// Produce the initial centroid set for a dataset
///
/// # Arguments
/// * `dataset` - Points to draw centroids from
/// * `k` - Number of centroids; `k` above the dataset size is allowed and may repeat points
/// * `strategy` - Initialization strategy
/// * `rng` - Source of every random draw
///
/// # Returns
/// * `k` centroids, or an empty set for `InitStrategy::Manual`
pub fn initialize<R: RandomSource + ?Sized>(
    dataset: &Dataset,
    k: usize,
    strategy: InitStrategy,
    rng: &mut R,
) -> Result<Vec<Point>, KMeansError> {
    if k < 1 {
        return Err(KMeansError::InvalidK { k });
    }

    let centroids = match strategy {
        InitStrategy::Random => (0..k).map(|_| dataset.sample(rng)).collect(),
        InitStrategy::FarthestFirst => farthest_first(dataset, k, rng),
        InitStrategy::KMeansPlusPlus => kmeans_plus_plus(dataset, k, rng),
        InitStrategy::Manual => Vec::new(),
    };

    info!(%strategy, k, placed = centroids.len(), "initialized centroids");
    Ok(centroids)
}

/// Distance from `point` to the closest centroid already chosen
fn min_distance(point: &Point, centroids: &[Point]) -> f64 {
    centroids
        .iter()
        .map(|c| distance(point, c))
        .fold(f64::INFINITY, f64::min)
}

fn farthest_first<R: RandomSource + ?Sized>(dataset: &Dataset, k: usize, rng: &mut R) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(dataset.sample(rng));

    while centroids.len() < k {
        let mut farthest = dataset.points()[0];
        let mut max_distance = -1.0;

        for point in dataset.points() {
            let d = min_distance(point, &centroids);
            if d > max_distance {
                max_distance = d;
                farthest = *point;
            }
        }

        debug!(centroid = %farthest, max_distance, "farthest-first pick");
        centroids.push(farthest);
    }

    centroids
}

fn kmeans_plus_plus<R: RandomSource + ?Sized>(dataset: &Dataset, k: usize, rng: &mut R) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(dataset.sample(rng));

    while centroids.len() < k {
        let weights: Vec<f64> = dataset
            .points()
            .iter()
            .map(|p| min_distance(p, &centroids).powi(2))
            .collect();
        let total: f64 = weights.iter().sum();

        // A zero total leaves the distribution undefined; an empty vector sends
        // the walk straight to its last-point fallback.
        let probabilities: Vec<f64> = if total > 0.0 {
            weights.iter().map(|w| w / total).collect()
        } else {
            Vec::new()
        };

        let u = rng.next_unit();
        let index = sample_cumulative(&probabilities, u).unwrap_or(dataset.len() - 1);

        debug!(index, u, "kmeans++ pick");
        centroids.push(dataset.points()[index]);
    }

    centroids
}

/// Walk the cumulative distribution of `probabilities` and return the first
/// index whose cumulative value is strictly greater than `u`
///
/// When rounding leaves the final cumulative value at or below `u`, the last
/// index is returned. `None` only for an empty distribution.
pub fn sample_cumulative(probabilities: &[f64], u: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    for (i, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if cumulative > u {
            return Some(i);
        }
    }
    probabilities.len().checked_sub(1)
}

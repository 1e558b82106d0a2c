//! Datasets: the immutable point sequence a session clusters, plus
//! host-side point generation and CSV loading using Polars

use crate::error::KMeansError;
use crate::geometry::Point;
use crate::random::RandomSource;
use anyhow::Context;
use polars::prelude::*;

/// Default number of generated points
pub const DEFAULT_POINT_COUNT: usize = 200;

/// Default half-width of the generation domain, giving `[-10, 10] x [-10, 10]`
pub const DEFAULT_RANGE: f64 = 10.0;

/// Settings for generating a random point set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataConfig {
    /// Number of points to draw
    pub count: usize,
    /// Coordinates are drawn uniformly from `[-range, range]`
    pub range: f64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_POINT_COUNT,
            range: DEFAULT_RANGE,
        }
    }
}

/// An ordered, non-empty sequence of points, fixed for one clustering session
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    points: Vec<Point>,
}

impl Dataset {
    /// Wrap a point sequence
    ///
    /// # Errors
    /// * `KMeansError::EmptyInput` if `points` is empty
    pub fn new(points: Vec<Point>) -> Result<Self, KMeansError> {
        if points.is_empty() {
            return Err(KMeansError::EmptyInput);
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Draw a uniformly random point from the dataset
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Point {
        self.points[rng.next_index(self.points.len())]
    }
}

/// Generate `config.count` points uniformly in `[-range, range] x [-range, range]`
pub fn generate_points<R: RandomSource + ?Sized>(
    config: &DataConfig,
    rng: &mut R,
) -> crate::Result<Dataset> {
    if !(config.range.is_finite() && config.range > 0.0) {
        anyhow::bail!("Coordinate range must be a positive number, got {}", config.range);
    }

    let span = 2.0 * config.range;
    let points = (0..config.count)
        .map(|_| {
            let x = rng.next_unit() * span - config.range;
            let y = rng.next_unit() * span - config.range;
            Point::new(x, y)
        })
        .collect();

    Dataset::new(points).context("Point count must be at least 1")
}

/// Load points from a CSV file with `x` and `y` columns
///
/// Rows with a missing coordinate are dropped. Other columns are ignored.
///
/// # Arguments
/// * `file_path` - Path to the CSV file
///
/// # Returns
/// * `Dataset` holding the points in file order
pub fn load_points_csv(file_path: &str) -> crate::Result<Dataset> {
    let df = LazyCsvReader::new(file_path)
        .has_header(true)
        .finish()
        .with_context(|| format!("Failed to open CSV file: {}", file_path))?
        .select([
            col("x").cast(DataType::Float64),
            col("y").cast(DataType::Float64),
        ])
        .drop_nulls(None)
        .collect()
        .with_context(|| format!("Failed to read x/y columns from: {}", file_path))?;

    if df.height() == 0 {
        anyhow::bail!("No valid points found in {}", file_path);
    }

    let xs: Vec<f64> = df.column("x")?.f64()?.into_no_null_iter().collect();
    let ys: Vec<f64> = df.column("y")?.f64()?.into_no_null_iter().collect();

    let points = xs
        .into_iter()
        .zip(ys)
        .map(|(x, y)| Point::new(x, y))
        .collect();

    Ok(Dataset::new(points)?)
}

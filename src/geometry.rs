//! Geometry primitives over 2-D points

use crate::error::KMeansError;
use std::fmt;

/// A point in the plane. Also used for centroids, which differ only by role.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Euclidean distance between two points
pub fn distance(a: &Point, b: &Point) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Squared Euclidean distance, used where the root would only be squared again
pub fn squared_distance(a: &Point, b: &Point) -> f64 {
    (a.x - b.x).powi(2) + (a.y - b.y).powi(2)
}

/// Arithmetic mean of a set of points
///
/// # Errors
/// * `KMeansError::EmptyInput` if `points` is empty
pub fn mean(points: &[Point]) -> Result<Point, KMeansError> {
    if points.is_empty() {
        return Err(KMeansError::EmptyInput);
    }

    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f64;

    Ok(Point::new(sum_x / n, sum_y / n))
}

//! Command-line interface definitions and argument parsing

use crate::data::{DataConfig, DEFAULT_POINT_COUNT, DEFAULT_RANGE};
use crate::geometry::Point;
use crate::init::InitStrategy;
use clap::Parser;

/// Step-by-step K-Means clustering of 2-D points
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Number of clusters
    #[arg(short = 'k', long, default_value_t = 3)]
    pub clusters: usize,

    /// Centroid initialization strategy
    #[arg(short, long, value_enum, default_value_t = InitStrategy::Random)]
    pub strategy: InitStrategy,

    /// Number of points to generate when no input file is given
    #[arg(short = 'n', long, default_value_t = DEFAULT_POINT_COUNT)]
    pub points: usize,

    /// Generated coordinates lie in [-range, range] on both axes
    #[arg(long, default_value_t = DEFAULT_RANGE)]
    pub range: f64,

    /// CSV file with `x` and `y` columns to cluster instead of generated points
    #[arg(short, long)]
    pub input: Option<String>,

    /// Manually placed centroid as "x,y"; repeat once per centroid (manual strategy)
    #[arg(long = "centroid", value_name = "X,Y", allow_hyphen_values = true)]
    pub centroids: Vec<String>,

    /// Seed for every random draw, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Perform this many single steps instead of running to convergence
    #[arg(long)]
    pub steps: Option<usize>,

    /// Maximum number of steps when running to convergence
    #[arg(long, default_value_t = 1000)]
    pub max_steps: usize,

    /// Pause between steps, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,

    /// Report the nearest final centroid for a point given as "x,y"
    #[arg(short, long, allow_hyphen_values = true)]
    pub predict: Option<String>,

    /// Output path for the cluster plot (PNG); a cluster size chart is written next to it
    #[arg(short, long)]
    pub output: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Settings for point generation
    pub fn data_config(&self) -> DataConfig {
        DataConfig {
            count: self.points,
            range: self.range,
        }
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Parse the manually placed centroids, in the order given
    pub fn parse_manual_centroids(&self) -> crate::Result<Vec<Point>> {
        self.centroids.iter().map(|s| parse_point(s)).collect()
    }

    /// Parse the prediction point, if one was given
    pub fn parse_predict_point(&self) -> crate::Result<Option<Point>> {
        self.predict.as_deref().map(parse_point).transpose()
    }
}

/// Parse a point from an "x,y" string
pub fn parse_point(value: &str) -> crate::Result<Point> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 2 {
        anyhow::bail!("Point must be in format 'x,y', got '{}'", value);
    }

    let x: f64 = parts[0]
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid x value: {}", parts[0]))?;
    let y: f64 = parts[1]
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid y value: {}", parts[1]))?;

    if !(x.is_finite() && y.is_finite()) {
        anyhow::bail!("Point coordinates must be finite, got '{}'", value);
    }

    Ok(Point::new(x, y))
}

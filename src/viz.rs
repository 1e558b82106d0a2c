//! Visualization and reporting of clustering results using Plotters

use crate::data::Dataset;
use crate::geometry::Point;
use crate::model::{cluster_sizes, inertia, silhouette_sample};
use crate::session::Session;
use anyhow::Context;
use plotters::prelude::*;

/// Category palette; cluster i uses entry `i % len`
const CLUSTER_COLORS: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Color used for points that have no cluster yet
const UNASSIGNED_COLOR: RGBColor = RGBColor(0, 0, 255);

/// Number of points used for the sampled silhouette score
const SILHOUETTE_SAMPLE: usize = 100;

fn cluster_color(cluster: usize) -> RGBColor {
    CLUSTER_COLORS[cluster % CLUSTER_COLORS.len()]
}

/// Axis bounds covering every point and centroid, padded by `padding`
pub fn plot_bounds(
    dataset: &Dataset,
    centroids: &[Point],
    padding: f64,
) -> ((f64, f64), (f64, f64)) {
    let bounds = |coord: fn(&Point) -> f64| {
        dataset
            .points()
            .iter()
            .chain(centroids)
            .map(coord)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    };

    let (x_min, x_max) = bounds(|p| p.x);
    let (y_min, y_max) = bounds(|p| p.y);

    ((x_min - padding, x_max + padding), (y_min - padding, y_max + padding))
}

/// Create scatter plot of the points colored by cluster, with centroids drawn on top
///
/// # Arguments
/// * `session` - Session whose dataset, centroids and assignment are drawn
/// * `output_path` - Path to save the PNG plot
/// * `plot_title` - Title for the plot
pub fn create_cluster_visualization(
    session: &Session,
    output_path: &str,
    plot_title: Option<&str>,
) -> crate::Result<()> {
    let title = plot_title.unwrap_or("K-Means Clustering");
    let dataset = session.dataset();
    let centroids = session.centroids();
    let assignment = session.assignment();

    let ((x_min, x_max), (y_min, y_max)) = plot_bounds(dataset, centroids, 0.5);

    let root = BitMapBackend::new(output_path, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(dataset.points().iter().enumerate().map(|(i, p)| {
        let color = assignment
            .and_then(|a| a.get(i))
            .map_or(UNASSIGNED_COLOR, |&cluster| cluster_color(cluster));
        Circle::new((p.x, p.y), 4, color.filled())
    }))?;

    for (cluster_id, centroid) in centroids.iter().enumerate() {
        let color = cluster_color(cluster_id);

        chart
            .draw_series(std::iter::once(Circle::new(
                (centroid.x, centroid.y),
                10,
                color.filled(),
            )))?
            .label(format!("Cluster {} centroid", cluster_id + 1))
            .legend(move |(x, y)| Circle::new((x + 5, y), 5, color.filled()));

        chart.draw_series(std::iter::once(Circle::new(
            (centroid.x, centroid.y),
            10,
            BLACK.stroke_width(2),
        )))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write plot to {}", output_path))?;
    println!("Cluster plot saved to: {}", output_path);

    Ok(())
}

/// Create a bar chart of cluster sizes
pub fn create_cluster_size_chart(sizes: &[usize], output_path: &str) -> crate::Result<()> {
    let max_size = *sizes.iter().max().unwrap_or(&1) as f64;

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Cluster Sizes", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(sizes.len() as f64 - 0.5), 0f64..(max_size.max(1.0) * 1.1))?;

    chart
        .configure_mesh()
        .x_desc("Cluster ID")
        .y_desc("Number of Points")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(sizes.iter().enumerate().map(|(cluster_id, &size)| {
        Rectangle::new(
            [
                (cluster_id as f64 - 0.4, 0.0),
                (cluster_id as f64 + 0.4, size as f64),
            ],
            cluster_color(cluster_id).filled(),
        )
    }))?;

    root.present()
        .with_context(|| format!("Failed to write chart to {}", output_path))?;
    println!("Cluster size chart saved to: {}", output_path);

    Ok(())
}

/// Print cluster statistics to console
pub fn print_cluster_statistics(session: &Session) {
    let dataset = session.dataset();
    let k = session.k();

    println!("\n=== Cluster Statistics ===");
    println!("Number of clusters: {}", k);
    println!("Total points: {}", dataset.len());

    let Some(assignment) = session.assignment() else {
        println!("No assignment computed yet");
        return;
    };

    println!(
        "Within-cluster sum of squares (Inertia): {:.2}",
        inertia(dataset, session.centroids(), assignment)
    );
    println!(
        "Silhouette score (sample): {:.3}",
        silhouette_sample(dataset, assignment, k, SILHOUETTE_SAMPLE)
    );

    println!("\nCluster sizes:");
    for (i, &size) in cluster_sizes(assignment, k).iter().enumerate() {
        let percentage = (size as f64 / dataset.len() as f64) * 100.0;
        println!("  Cluster {}: {} points ({:.1}%)", i, size, percentage);
    }

    println!("\nCluster centroids:");
    println!("  Cluster |       x |       y");
    println!("  --------|---------|---------");
    for (i, centroid) in session.centroids().iter().enumerate() {
        println!("  {:7} | {:7.2} | {:7.2}", i, centroid.x, centroid.y);
    }
}

/// Path of the size chart written next to the main plot
pub fn size_chart_path(base_output_path: &str) -> String {
    match base_output_path.strip_suffix(".png") {
        Some(stem) => format!("{}_sizes.png", stem),
        None => format!("{}_sizes.png", base_output_path),
    }
}

/// Write the cluster plot and size chart, then print statistics
pub fn generate_visualization_report(session: &Session, base_output_path: &str) -> crate::Result<()> {
    create_cluster_visualization(session, base_output_path, None)?;

    let sizes = session
        .assignment()
        .map(|assignment| cluster_sizes(assignment, session.k()))
        .unwrap_or_else(|| vec![0; session.k()]);
    create_cluster_size_chart(&sizes, &size_chart_path(base_output_path))?;

    print_cluster_statistics(session);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::InitStrategy;
    use crate::random::seeded;
    use std::path::Path;
    use tempfile::tempdir;

    fn create_test_session() -> Session {
        let dataset = Dataset::new(vec![
            Point::new(-1.0, -1.0),
            Point::new(1.0, 1.0),
            Point::new(-0.5, 0.5),
            Point::new(0.5, -0.5),
            Point::new(0.0, 0.0),
            Point::new(-0.2, 0.8),
        ])
        .unwrap();

        let mut session = Session::new(dataset, 3, InitStrategy::FarthestFirst).unwrap();
        let mut rng = seeded(Some(42));
        session.initialize(&mut rng).unwrap();
        session.step(&mut rng).unwrap();
        session
    }

    #[test]
    fn test_plot_bounds() {
        let session = create_test_session();
        let extra = [Point::new(3.0, -4.0)];

        let ((x_min, x_max), (y_min, y_max)) = plot_bounds(session.dataset(), &extra, 0.5);
        assert_eq!((x_min, x_max), (-1.5, 3.5));
        assert_eq!((y_min, y_max), (-4.5, 1.5));
    }

    #[test]
    fn test_size_chart_path() {
        assert_eq!(size_chart_path("plot.png"), "plot_sizes.png");
        assert_eq!(size_chart_path("out/plot"), "out/plot_sizes.png");
    }

    #[test]
    fn test_cluster_color_wraps() {
        assert_eq!(cluster_color(0), cluster_color(CLUSTER_COLORS.len()));
    }

    #[test]
    fn test_create_cluster_visualization() {
        let session = create_test_session();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("test_plot.png");
        let output_str = output_path.to_str().unwrap();

        let result = create_cluster_visualization(&session, output_str, Some("Test Plot"));
        assert!(result.is_ok());
        assert!(Path::new(output_str).exists());
    }

    #[test]
    fn test_create_cluster_visualization_before_first_step() {
        let dataset = Dataset::new(vec![
            Point::new(-2.0, 1.0),
            Point::new(2.0, -1.0),
            Point::new(0.5, 0.5),
        ])
        .unwrap();
        let mut session = Session::new(dataset, 2, InitStrategy::Random).unwrap();
        session.initialize(&mut seeded(Some(7))).unwrap();
        assert_eq!(session.assignment(), None);

        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("unassigned.png");
        let output_str = output_path.to_str().unwrap();

        let result = create_cluster_visualization(&session, output_str, None);
        assert!(result.is_ok());
        assert!(Path::new(output_str).exists());
    }

    #[test]
    fn test_create_cluster_size_chart() {
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("test_sizes.png");
        let output_str = output_path.to_str().unwrap();

        let result = create_cluster_size_chart(&[3, 0, 2], output_str);
        assert!(result.is_ok());
        assert!(Path::new(output_str).exists());
    }

    #[test]
    fn test_generate_visualization_report() {
        let session = create_test_session();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("test_report.png");
        let output_str = output_path.to_str().unwrap();

        let result = generate_visualization_report(&session, output_str);
        assert!(result.is_ok());
        assert!(Path::new(output_str).exists());
        assert!(Path::new(&size_chart_path(output_str)).exists());
    }
}

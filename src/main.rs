//! kmeans-stepper: K-Means clustering of 2-D points, one step at a time
//!
//! This is the main entrypoint that builds a dataset, initializes centroids,
//! drives the clustering engine and reports the result.

use anyhow::{Context, Result};
use clap::Parser;
use kmeans_stepper::{
    generate_points, load_points_csv, nearest_centroid, seeded, viz, Args, CancelToken,
    InitStrategy, RunOutcome, Session, StepResult,
};
use rand::rngs::StdRng;
use std::thread;
use std::time::{Duration, Instant};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_logging(&args);

    if args.verbose {
        println!("kmeans-stepper - Incremental K-Means clustering");
        println!("===============================================\n");
    }

    let start_time = Instant::now();
    let mut rng = seeded(args.seed);

    // Step 1: Build the dataset
    let dataset = match &args.input {
        Some(path) => {
            info!(path = %path, "loading points");
            load_points_csv(path)?
        }
        None => generate_points(&args.data_config(), &mut rng)?,
    };
    println!("✓ Dataset ready: {} points", dataset.len());

    // Step 2: Place the initial centroids
    let mut session = Session::new(dataset, args.clusters, args.strategy)?;
    place_centroids(&args, &mut session, &mut rng)?;
    println!("✓ Centroids initialized ({})", args.strategy);
    for (i, centroid) in session.centroids().iter().enumerate() {
        println!("  Centroid {}: {}", i, centroid);
    }

    // Step 3: Cluster
    let delay = Duration::from_millis(args.delay_ms);
    match args.steps {
        Some(steps) => run_single_steps(&mut session, &mut rng, steps, delay)?,
        None => run_until_converged(&args, &mut session, &mut rng, delay)?,
    }

    // Step 4: Report
    if let Some(point) = args.parse_predict_point()? {
        let cluster = nearest_centroid(&point, session.centroids())
            .context("No centroids available for prediction")?;
        println!("\n✓ Predicted cluster for {}: {}", point, cluster);
    }

    match &args.output {
        Some(output) => viz::generate_visualization_report(&session, output)?,
        None => viz::print_cluster_statistics(&session),
    }

    println!("\n=== Clustering Complete ===");
    println!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

/// Install the tracing subscriber; `RUST_LOG` overrides the verbosity flag
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize centroids with the chosen strategy, or place the manual ones
fn place_centroids(args: &Args, session: &mut Session, rng: &mut StdRng) -> Result<()> {
    let manual = args.parse_manual_centroids()?;

    if args.strategy != InitStrategy::Manual {
        if !manual.is_empty() {
            warn!("--centroid is only used with the manual strategy; ignoring");
        }
        session.initialize(rng)?;
        return Ok(());
    }

    for point in manual {
        if !session.place_manual_centroid(point) {
            warn!(%point, "centroid beyond k ignored");
        }
    }

    if session.centroids().len() != session.k() {
        anyhow::bail!(
            "Manual strategy needs {} centroids, got {}; pass --centroid x,y once per cluster",
            session.k(),
            session.centroids().len()
        );
    }

    Ok(())
}

fn print_step(index: usize, result: &StepResult, session: &Session) {
    let inertia = session.inertia().unwrap_or(0.0);
    if result.changed {
        println!("Step {}: assignment changed, inertia {:.4}", index, inertia);
    } else {
        println!("Step {}: assignment stable, inertia {:.4}", index, inertia);
    }
}

/// Perform a fixed number of single steps, stopping early once converged
fn run_single_steps(
    session: &mut Session,
    rng: &mut StdRng,
    steps: usize,
    delay: Duration,
) -> Result<()> {
    println!("\n=== Single Steps ===");

    for index in 1..=steps {
        let result = session.step(rng)?;
        print_step(index, &result, session);

        if !result.changed {
            println!("\n✓ Converged after {} steps", index);
            return Ok(());
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    println!("\nStopped after {} steps (not yet converged)", steps);
    Ok(())
}

/// Run to convergence, pausing between steps when a delay is configured
fn run_until_converged(
    args: &Args,
    session: &mut Session,
    rng: &mut StdRng,
    delay: Duration,
) -> Result<()> {
    println!("\n=== Run to Convergence ===");

    let cancel = CancelToken::new();
    cancel_on_ctrl_c(cancel.clone())?;
    let mut run = session.run_to_convergence(rng, cancel, Some(args.max_steps))?;
    let mut index = 0;

    while let Some(result) = run.next() {
        let result = result?;
        index += 1;
        print_step(index, &result, run.session());

        if result.changed && !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    match run.outcome() {
        Some(RunOutcome::Converged) => println!("\n✓ Converged after {} steps", run.steps()),
        Some(RunOutcome::StepLimit) => {
            println!("\nStopped after {} steps (step limit reached)", run.steps())
        }
        Some(RunOutcome::Cancelled) => {
            println!("\nCancelled after {} steps (not yet converged)", run.steps())
        }
        other => println!("\nRun stopped: {:?}", other),
    }

    Ok(())
}

/// Cancel `cancel` when Ctrl+C arrives; the run stops before its next step
fn cancel_on_ctrl_c(cancel: CancelToken) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start signal listener")?;

    thread::spawn(move || {
        runtime.block_on(async move {
            if signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, stopping after the current step");
                cancel.cancel();
            }
        })
    });

    Ok(())
}

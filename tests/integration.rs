//! Integration tests for kmeans-stepper

use kmeans_stepper::{
    generate_points, load_points_csv, seeded, CancelToken, DataConfig, Dataset, EngineState,
    InitStrategy, Point, RunOutcome, Session, StepResult,
};
use std::io::Write;
use tempfile::NamedTempFile;

const STRATEGIES: [InitStrategy; 3] = [
    InitStrategy::Random,
    InitStrategy::FarthestFirst,
    InitStrategy::KMeansPlusPlus,
];

fn random_dataset(seed: u64) -> Dataset {
    let mut rng = seeded(Some(seed));
    generate_points(&DataConfig::default(), &mut rng).unwrap()
}

/// Initialize and step until converged, collecting every step
fn trajectory(dataset: &Dataset, k: usize, strategy: InitStrategy, seed: u64) -> Vec<StepResult> {
    let mut rng = seeded(Some(seed));
    let mut session = Session::new(dataset.clone(), k, strategy).unwrap();
    session.initialize(&mut rng).unwrap();

    let mut steps = Vec::new();
    for _ in 0..500 {
        let result = session.step(&mut rng).unwrap();
        let changed = result.changed;
        steps.push(result);
        if !changed {
            break;
        }
    }
    steps
}

#[test]
fn test_trajectory_is_deterministic() {
    let dataset = random_dataset(1);

    for strategy in STRATEGIES {
        let first = trajectory(&dataset, 4, strategy, 99);
        let second = trajectory(&dataset, 4, strategy, 99);
        assert_eq!(first, second, "trajectory differs for {}", strategy);
    }
}

#[test]
fn test_terminates_with_valid_assignments() {
    for seed in 0..5 {
        let dataset = random_dataset(seed);

        for strategy in STRATEGIES {
            for k in [1, 3, 7] {
                let steps = trajectory(&dataset, k, strategy, seed + 100);
                let last = steps.last().unwrap();
                assert!(!last.changed, "no convergence for k={} {}", k, strategy);

                for step in &steps {
                    assert_eq!(step.assignment.len(), dataset.len());
                    assert!(step.assignment.iter().all(|&c| c < k));
                    assert_eq!(step.centroids.len(), k);
                }
            }
        }
    }
}

#[test]
fn test_inertia_never_increases() {
    for seed in 0..5 {
        let dataset = random_dataset(seed);

        for strategy in STRATEGIES {
            let mut rng = seeded(Some(seed));
            let mut session = Session::new(dataset.clone(), 5, strategy).unwrap();
            session.initialize(&mut rng).unwrap();

            let mut previous = f64::INFINITY;
            for _ in 0..500 {
                let changed = session.step(&mut rng).unwrap().changed;
                let current = session.inertia().unwrap();
                assert!(
                    current <= previous + 1e-9 * previous.max(1.0),
                    "inertia rose from {} to {}",
                    previous,
                    current
                );
                previous = current;
                if !changed {
                    break;
                }
            }
            assert!(session.is_converged());
        }
    }
}

#[test]
fn test_interleaved_steps_match_plain_stepping() {
    let dataset = random_dataset(7);
    let expected = trajectory(&dataset, 4, InitStrategy::KMeansPlusPlus, 5);

    let mut rng = seeded(Some(5));
    let mut session = Session::new(dataset, 4, InitStrategy::KMeansPlusPlus).unwrap();
    session.initialize(&mut rng).unwrap();

    let mut actual = vec![session.step(&mut rng).unwrap()];
    let run = session
        .run_to_convergence(&mut rng, CancelToken::new(), None)
        .unwrap();
    actual.extend(run.map(|r| r.unwrap()));

    assert_eq!(actual, expected);
    assert_eq!(session.state(), EngineState::Converged);
}

#[test]
fn test_run_to_convergence_reports_outcome() {
    let dataset = random_dataset(3);
    let mut rng = seeded(Some(3));
    let mut session = Session::new(dataset, 3, InitStrategy::FarthestFirst).unwrap();
    session.initialize(&mut rng).unwrap();

    let mut run = session
        .run_to_convergence(&mut rng, CancelToken::new(), Some(500))
        .unwrap();
    let results: Vec<StepResult> = run.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(run.outcome(), Some(RunOutcome::Converged));
    assert_eq!(run.steps(), results.len());
    assert!(results[..results.len() - 1].iter().all(|r| r.changed));
    assert!(!results.last().unwrap().changed);
}

#[test]
fn test_more_clusters_than_distinct_points() {
    let dataset = Dataset::new(vec![
        Point::new(1.0, 1.0),
        Point::new(1.0, 1.0),
        Point::new(-2.0, 3.0),
    ])
    .unwrap();

    for strategy in STRATEGIES {
        let steps = trajectory(&dataset, 3, strategy, 8);
        let last = steps.last().unwrap();
        assert!(!last.changed);
        assert!(last.assignment.iter().all(|&c| c < 3));
    }
}

#[test]
fn test_end_to_end_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "x,y").unwrap();
    for (x, y) in [
        (-5.0, -5.0),
        (-5.5, -4.5),
        (-4.5, -5.5),
        (5.0, 5.0),
        (5.5, 4.5),
        (4.5, 5.5),
    ] {
        writeln!(file, "{},{}", x, y).unwrap();
    }

    let dataset = load_points_csv(file.path().to_str().unwrap()).unwrap();
    assert_eq!(dataset.len(), 6);

    let mut session = Session::new(dataset, 2, InitStrategy::Manual).unwrap();
    assert!(session.place_manual_centroid(Point::new(-1.0, 0.0)));
    assert!(session.place_manual_centroid(Point::new(1.0, 0.0)));
    assert!(!session.place_manual_centroid(Point::new(0.0, 0.0)));

    let mut rng = seeded(Some(0));
    let run = session
        .run_to_convergence(&mut rng, CancelToken::new(), None)
        .unwrap();
    assert_eq!(run.count(), 2);

    assert_eq!(session.assignment(), Some(&[0, 0, 0, 1, 1, 1][..]));
    assert_eq!(
        session.centroids(),
        &[Point::new(-5.0, -5.0), Point::new(5.0, 5.0)]
    );
    assert_eq!(session.inertia(), Some(2.0));
}

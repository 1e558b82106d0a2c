//! Clustering session: the caller-owned state the engine operates on

use crate::data::Dataset;
use crate::error::KMeansError;
use crate::geometry::Point;
use crate::init::{initialize, InitStrategy};
use crate::model::{self, StepResult};
use crate::random::RandomSource;
use tracing::{debug, info};

/// Where a session stands in the clustering lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Fewer than k centroids placed
    Uninitialized,
    /// Exactly k centroids, assignment absent or still changing
    Ready,
    /// The last step left the assignment unchanged
    Converged,
}

/// Dataset, parameters and derived clustering state for one clustering session
///
/// The session only changes through its methods. Changing k, the strategy or
/// the dataset resets all derived state; the dataset itself survives a reset.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Dataset,
    k: usize,
    strategy: InitStrategy,
    centroids: Vec<Point>,
    assignment: Option<Vec<usize>>,
    converged: bool,
    running: bool,
}

impl Session {
    /// Create a session with no centroids and no assignment
    ///
    /// # Errors
    /// * `KMeansError::InvalidK` if `k < 1`
    pub fn new(dataset: Dataset, k: usize, strategy: InitStrategy) -> Result<Self, KMeansError> {
        if k < 1 {
            return Err(KMeansError::InvalidK { k });
        }

        Ok(Self {
            dataset,
            k,
            strategy,
            centroids: Vec::new(),
            assignment: None,
            converged: false,
            running: false,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn strategy(&self) -> InitStrategy {
        self.strategy
    }

    pub fn centroids(&self) -> &[Point] {
        &self.centroids
    }

    /// Current assignment, `None` until the first step
    pub fn assignment(&self) -> Option<&[usize]> {
        self.assignment.as_deref()
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub(crate) fn clear_converged(&mut self) {
        self.converged = false;
    }

    pub fn state(&self) -> EngineState {
        if self.centroids.len() != self.k {
            EngineState::Uninitialized
        } else if self.converged {
            EngineState::Converged
        } else {
            EngineState::Ready
        }
    }

    /// Inertia of the current assignment, `None` before the first step
    pub fn inertia(&self) -> Option<f64> {
        self.assignment
            .as_deref()
            .map(|assignment| model::inertia(&self.dataset, &self.centroids, assignment))
    }

    /// Clear centroids, assignment and flags; the dataset is kept
    pub fn reset(&mut self) {
        self.centroids.clear();
        self.assignment = None;
        self.converged = false;
        self.running = false;
        debug!(k = self.k, strategy = %self.strategy, "session reset");
    }

    /// Change the number of clusters and reset
    ///
    /// # Errors
    /// * `KMeansError::InvalidK` if `k < 1`; the session is left untouched
    pub fn set_k(&mut self, k: usize) -> Result<(), KMeansError> {
        if k < 1 {
            return Err(KMeansError::InvalidK { k });
        }
        self.k = k;
        self.reset();
        Ok(())
    }

    /// Change the initialization strategy and reset
    pub fn set_strategy(&mut self, strategy: InitStrategy) {
        self.strategy = strategy;
        self.reset();
    }

    /// Replace the dataset and reset
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.reset();
    }

    /// Run the session's initialization strategy
    ///
    /// Replaces the centroid set and clears the assignment. For the manual
    /// strategy this only clears derived state; centroids then come from
    /// [`Session::place_manual_centroid`].
    pub fn initialize<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<(), KMeansError> {
        let centroids = initialize(&self.dataset, self.k, self.strategy, rng)?;
        self.centroids = centroids;
        self.assignment = None;
        self.converged = false;
        Ok(())
    }

    /// Append a manually placed centroid
    ///
    /// Only accepted in manual mode, while fewer than k centroids exist and no
    /// run is in progress. Returns whether the centroid was placed.
    pub fn place_manual_centroid(&mut self, point: Point) -> bool {
        if self.strategy != InitStrategy::Manual || self.running || self.centroids.len() >= self.k {
            debug!(%point, "manual placement ignored");
            return false;
        }

        self.centroids.push(point);
        info!(
            %point,
            placed = self.centroids.len(),
            k = self.k,
            "manual centroid placed"
        );
        true
    }

    /// Perform one Assign + Update step and store its outcome
    ///
    /// On error the session is left untouched.
    pub fn step<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<StepResult, KMeansError> {
        let result = model::step(
            &self.dataset,
            self.k,
            &self.centroids,
            self.assignment.as_deref(),
            rng,
        )?;

        self.assignment = Some(result.assignment.clone());
        self.centroids = result.centroids.clone();
        self.converged = !result.changed;

        if self.converged {
            info!(k = self.k, "clustering converged");
        }

        Ok(result)
    }
}

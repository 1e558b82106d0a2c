//! Run controller: drive a session step by step until it converges or is cancelled

use crate::error::KMeansError;
use crate::model::StepResult;
use crate::random::RandomSource;
use crate::session::Session;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared flag that stops a run before its next step
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Why a run stopped producing steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Converged,
    Cancelled,
    StepLimit,
    Failed,
}

/// Lazy sequence of step results for one run to convergence
///
/// Each call to `next` performs exactly one session step, so the host regains
/// control between steps to render, sleep, or cancel. The run ends after the
/// first unchanged step, an error, cancellation, or the step limit. The
/// session's running flag is cleared when the run ends or is dropped.
pub struct Run<'a, R: RandomSource + ?Sized> {
    session: &'a mut Session,
    rng: &'a mut R,
    cancel: CancelToken,
    max_steps: Option<usize>,
    steps: usize,
    outcome: Option<RunOutcome>,
}

impl<'a, R: RandomSource + ?Sized> Run<'a, R> {
    /// Number of steps performed so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// How the run ended, `None` while it can still produce steps
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    /// The session being driven
    pub fn session(&self) -> &Session {
        &*self.session
    }

    fn finish(&mut self, outcome: RunOutcome) {
        self.outcome = Some(outcome);
        self.session.set_running(false);
        info!(?outcome, steps = self.steps, "run to convergence stopped");
    }
}

impl<'a, R: RandomSource + ?Sized> Iterator for Run<'a, R> {
    type Item = Result<StepResult, KMeansError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.outcome.is_some() {
            return None;
        }

        if self.cancel.is_cancelled() {
            self.finish(RunOutcome::Cancelled);
            return None;
        }

        if self.max_steps.is_some_and(|max| self.steps >= max) {
            self.finish(RunOutcome::StepLimit);
            return None;
        }

        let result = self.session.step(&mut *self.rng);
        self.steps += 1;

        match &result {
            Ok(step) if !step.changed => self.finish(RunOutcome::Converged),
            Ok(_) => debug!(step = self.steps, "run step"),
            Err(_) => self.finish(RunOutcome::Failed),
        }

        Some(result)
    }
}

impl<'a, R: RandomSource + ?Sized> Drop for Run<'a, R> {
    fn drop(&mut self) {
        self.session.set_running(false);
    }
}

impl Session {
    /// Start a run to convergence
    ///
    /// # Arguments
    /// * `rng` - Source for empty-cluster reseeding draws
    /// * `cancel` - Checked before every step
    /// * `max_steps` - Optional cap on the number of steps
    ///
    /// # Errors
    /// * `KMeansError::CentroidCountMismatch` if the session does not hold
    ///   exactly k centroids; the session is left untouched
    pub fn run_to_convergence<'a, R: RandomSource + ?Sized>(
        &'a mut self,
        rng: &'a mut R,
        cancel: CancelToken,
        max_steps: Option<usize>,
    ) -> Result<Run<'a, R>, KMeansError> {
        if self.centroids().len() != self.k() {
            return Err(KMeansError::CentroidCountMismatch {
                expected: self.k(),
                found: self.centroids().len(),
            });
        }

        self.set_running(true);
        self.clear_converged();
        info!(k = self.k(), ?max_steps, "run to convergence started");

        Ok(Run {
            session: self,
            rng,
            cancel,
            max_steps,
            steps: 0,
            outcome: None,
        })
    }
}

//! # Spherical k-means dictionary learning
//!
//! Atoms live on the unit sphere and patches are assigned by correlation
//! rather than Euclidean distance. Every iteration:
//!
//! 1. assigns each patch to its max-|projection| atom, keeping the signed
//!    projection ([`assign_top1`]),
//! 2. measures `‖D·S − X‖²_F` and stops once its relative decrease falls
//!    below [`CONVERGENCE_TOLERANCE`],
//! 3. reseeds atoms that received no patch with random training patches, for
//!    as long as the previous checks kept finding empty atoms,
//! 4. accumulates `D ← D + X·Sᵀ` and renormalizes every atom.
//!
//! The empty-atom check is switched off for good after the first iteration
//! that finds none. Atoms that empty out later are not reseeded.

pub mod assign;

#[cfg(test)]
mod tests;

use ndarray::{Array2, ArrayView2, ShapeBuilder};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::FilterConfig;
use crate::error::{ConfigError, Result};
use crate::ops::{frobenius_sq, unit_normalize, unit_normalize_columns};

pub use self::assign::{assign_top1, empty_atoms};

/// Iteration cap of the learning loop.
pub const MAX_ITERATIONS: usize = 200;

/// Relative SSE decrease below which learning stops.
pub const CONVERGENCE_TOLERANCE: f64 = 1e-12;

/// Summary of one learning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Assignment steps performed, including the one that detected convergence.
    pub iterations: usize,
    /// Whether the loop stopped on the tolerance rather than the cap.
    pub converged: bool,
    /// Sum of squared reconstruction errors, one entry per iteration.
    pub sse_history: Vec<f64>,
    /// Atoms reseeded per iteration, for the iterations that checked.
    pub empty_atoms: Vec<usize>,
}

impl TrainingReport {
    pub fn final_sse(&self) -> Option<f64> {
        self.sse_history.last().copied()
    }

    pub fn total_reseeded(&self) -> usize {
        self.empty_atoms.iter().sum()
    }
}

/// Learning state exposed to observers after each assignment step.
#[derive(Debug)]
pub struct IterationSnapshot<'a> {
    pub iteration: usize,
    /// Dictionary the assignments were computed against.
    pub dictionary: &'a Array2<f64>,
    pub assignments: &'a Array2<f64>,
    pub sse: f64,
}

/// Dictionary atoms together with their training report.
#[derive(Debug, Clone)]
pub struct KMeansOutcome {
    pub atoms: Array2<f64>,
    pub report: TrainingReport,
}

/// Spherical k-means over whitened patch columns.
#[derive(Debug, Clone, Copy)]
pub struct DictionaryLearner {
    num_atoms: usize,
    max_iterations: usize,
    tolerance: f64,
}

impl DictionaryLearner {
    pub fn new(num_atoms: usize) -> Self {
        Self {
            num_atoms,
            max_iterations: MAX_ITERATIONS,
            tolerance: CONVERGENCE_TOLERANCE,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.num_atoms)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn num_atoms(&self) -> usize {
        self.num_atoms
    }

    /// `dim × K` standard-normal atoms, drawn column by column and normalized.
    pub fn initialize<R: Rng + ?Sized>(&self, dim: usize, rng: &mut R) -> Array2<f64> {
        let mut atoms = Array2::random_using((dim, self.num_atoms).f(), StandardNormal, rng);
        unit_normalize_columns(&mut atoms);
        atoms
    }

    pub fn learn<R: Rng + ?Sized>(&self, x: &ArrayView2<f64>, rng: &mut R) -> Result<KMeansOutcome> {
        self.learn_observed(x, rng, |_| {})
    }

    /// Runs the learning loop, calling `observe` after every assignment step.
    pub fn learn_observed<R, F>(
        &self,
        x: &ArrayView2<f64>,
        rng: &mut R,
        mut observe: F,
    ) -> Result<KMeansOutcome>
    where
        R: Rng + ?Sized,
        F: FnMut(&IterationSnapshot<'_>),
    {
        if self.num_atoms == 0 {
            return Err(ConfigError::ZeroParameter { name: "num_atoms" }.into());
        }
        if x.ncols() == 0 {
            return Err(ConfigError::EmptyTrainingSet.into());
        }

        debug!(num_atoms = self.num_atoms, dim = x.nrows(), "initializing dictionary");
        let mut dictionary = self.initialize(x.nrows(), rng);
        let mut report = TrainingReport::default();
        let mut previous_sse: Option<f64> = None;
        let mut maybe_empty = true;

        debug!(num_patches = x.ncols(), "running spherical k-means");
        for iteration in 0..self.max_iterations {
            let assignments = assign_top1(&dictionary.view(), x);
            let sse = reconstruction_error(&dictionary.view(), &assignments.view(), x);
            debug!(iteration, sse, "sum of squared errors");

            report.iterations = iteration + 1;
            report.sse_history.push(sse);
            observe(&IterationSnapshot {
                iteration,
                dictionary: &dictionary,
                assignments: &assignments,
                sse,
            });

            if let Some(previous) = previous_sse {
                if has_converged(previous, sse, self.tolerance) {
                    report.converged = true;
                    break;
                }
            }
            previous_sse = Some(sse);

            if maybe_empty {
                let reseeded = reseed_empty_atoms(&mut dictionary, &assignments.view(), x, rng);
                debug!(iteration, reseeded, "empty atoms");
                report.empty_atoms.push(reseeded);
                if reseeded == 0 {
                    maybe_empty = false;
                }
            }

            dictionary = update_dictionary(dictionary, &assignments.view(), x);
        }

        info!(
            iterations = report.iterations,
            converged = report.converged,
            final_sse = ?report.final_sse(),
            reseeded = report.total_reseeded(),
            "dictionary learning finished"
        );
        Ok(KMeansOutcome {
            atoms: dictionary,
            report,
        })
    }
}

/// `‖D·S − X‖²_F`
pub fn reconstruction_error(
    dictionary: &ArrayView2<f64>,
    assignments: &ArrayView2<f64>,
    x: &ArrayView2<f64>,
) -> f64 {
    let residual = dictionary.dot(assignments) - x;
    frobenius_sq(&residual.view())
}

/// Relative SSE decrease below `tolerance`, or any increase.
///
/// A previous SSE of exactly zero counts as converged. The plain ratio would be
/// `0 / 0 = NaN`, which never compares below the tolerance and would keep the
/// loop running to the iteration cap.
fn has_converged(previous: f64, sse: f64, tolerance: f64) -> bool {
    if previous == 0.0 {
        return true;
    }
    (previous - sse) / previous < tolerance
}

/// Replaces every atom without patches by a random training column, normalized.
fn reseed_empty_atoms<R: Rng + ?Sized>(
    dictionary: &mut Array2<f64>,
    assignments: &ArrayView2<f64>,
    x: &ArrayView2<f64>,
    rng: &mut R,
) -> usize {
    let empty = empty_atoms(assignments);
    for &k in &empty {
        let c = rng.gen_range(0..x.ncols());
        let mut atom = dictionary.column_mut(k);
        atom.assign(&x.column(c));
        unit_normalize(atom);
    }
    empty.len()
}

/// `D + X·Sᵀ`, renormalized column-wise.
fn update_dictionary(
    dictionary: Array2<f64>,
    assignments: &ArrayView2<f64>,
    x: &ArrayView2<f64>,
) -> Array2<f64> {
    let mut next = dictionary + x.dot(&assignments.t());
    unit_normalize_columns(&mut next);
    next
}

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::ops::column_norm_sq;

pub mod invariants_test;

/// Columns scattered around a few random directions.
pub(crate) fn clustered_patches(dim: usize, clusters: usize, per_cluster: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers: Vec<Array1<f64>> = (0..clusters)
        .map(|_| Array1::from_shape_fn(dim, |_| rng.gen_range(-1.0..1.0)))
        .collect();
    let mut x = Array2::zeros((dim, clusters * per_cluster));
    for (c, center) in centers.iter().enumerate() {
        for p in 0..per_cluster {
            let noise = Array1::from_shape_fn(dim, |_| rng.gen_range(-0.05..0.05));
            x.column_mut(c * per_cluster + p).assign(&(center * 3.0 + noise));
        }
    }
    x
}

#[test]
fn initial_atoms_are_unit_norm() {
    let mut rng = StdRng::seed_from_u64(5);
    let atoms = DictionaryLearner::new(7).initialize(12, &mut rng);
    assert_eq!(atoms.dim(), (12, 7));
    for &norm_sq in column_norm_sq(&atoms.view()).iter() {
        assert!((norm_sq - 1.0).abs() < 1e-12);
    }
}

#[test]
fn empty_patch_matrix_is_rejected() {
    let x = Array2::<f64>::zeros((6, 0));
    let mut rng = StdRng::seed_from_u64(0);
    let err = DictionaryLearner::new(3).learn(&x.view(), &mut rng).unwrap_err();
    assert!(matches!(
        err,
        crate::error::FeatureError::Configuration(ConfigError::EmptyTrainingSet)
    ));
}

#[test]
fn zero_previous_sse_counts_as_converged() {
    assert!(has_converged(0.0, 0.0, CONVERGENCE_TOLERANCE));
    assert!(has_converged(4.0, 4.0, CONVERGENCE_TOLERANCE));
    assert!(has_converged(4.0, 5.0, CONVERGENCE_TOLERANCE));
    assert!(!has_converged(4.0, 3.0, CONVERGENCE_TOLERANCE));
}

#[test]
fn exact_fit_stops_before_the_cap() {
    // One patch and one atom: every update halves the off-axis part of the atom,
    // so the error reaches zero long before the cap and must stop the loop.
    let x = Array2::from_shape_vec((2, 1), vec![1.0, 0.0]).unwrap();
    let mut rng = StdRng::seed_from_u64(4);
    let outcome = DictionaryLearner::new(1).learn(&x.view(), &mut rng).unwrap();
    assert!(outcome.report.converged);
    assert!(outcome.report.iterations < MAX_ITERATIONS);
}

#[test]
fn iteration_cap_is_respected() {
    let x = clustered_patches(8, 4, 10, 11);
    let mut rng = StdRng::seed_from_u64(2);
    let outcome = DictionaryLearner::new(4)
        .with_max_iterations(3)
        .learn(&x.view(), &mut rng)
        .unwrap();
    assert!(outcome.report.iterations <= 3);
    assert_eq!(outcome.report.sse_history.len(), outcome.report.iterations);
}

//! Per-iteration invariants of the learning loop.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::clustered_patches;
use crate::kmeans::DictionaryLearner;
use crate::ops::column_norm_sq;

#[test]
fn atoms_stay_unit_norm_every_iteration() {
    let x = clustered_patches(10, 5, 12, 21);
    let mut rng = StdRng::seed_from_u64(8);
    let mut checked = 0;
    let outcome = DictionaryLearner::new(6)
        .learn_observed(&x.view(), &mut rng, |step| {
            for &norm_sq in column_norm_sq(&step.dictionary.view()).iter() {
                assert!(
                    (norm_sq - 1.0).abs() < 1e-9,
                    "iteration {}: atom norm² {}",
                    step.iteration,
                    norm_sq
                );
            }
            checked += 1;
        })
        .unwrap();
    assert!(checked > 0);
    for &norm_sq in column_norm_sq(&outcome.atoms.view()).iter() {
        assert!((norm_sq - 1.0).abs() < 1e-9);
    }
}

#[test]
fn each_patch_keeps_its_largest_projection_only() {
    let x = clustered_patches(9, 3, 15, 4);
    let mut rng = StdRng::seed_from_u64(13);
    DictionaryLearner::new(5)
        .learn_observed(&x.view(), &mut rng, |step| {
            let projections = step.dictionary.t().dot(&x);
            for (c, col) in step.assignments.columns().into_iter().enumerate() {
                let nonzero: Vec<usize> = col
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| **v != 0.0)
                    .map(|(k, _)| k)
                    .collect();
                assert!(nonzero.len() <= 1);
                let max_abs = projections
                    .column(c)
                    .iter()
                    .fold(0.0f64, |m, v| m.max(v.abs()));
                if let Some(&k) = nonzero.first() {
                    assert_eq!(col[k].abs(), max_abs);
                    assert_eq!(col[k], projections[[k, c]]);
                }
            }
        })
        .unwrap();
}

#[test]
fn learning_reduces_reconstruction_error() {
    let x = clustered_patches(12, 6, 20, 99);
    let mut rng = StdRng::seed_from_u64(1);
    let outcome = DictionaryLearner::new(6).learn(&x.view(), &mut rng).unwrap();
    let history = &outcome.report.sse_history;
    assert!(history.len() >= 2);
    let first = history[0];
    let last = outcome.report.final_sse().unwrap();
    assert!(last < first, "sse went from {} to {}", first, last);
}

#[test]
fn sse_does_not_increase_before_the_break() {
    let x = clustered_patches(12, 6, 20, 99);
    let mut rng = StdRng::seed_from_u64(1);
    let outcome = DictionaryLearner::new(6).learn(&x.view(), &mut rng).unwrap();
    let history = &outcome.report.sse_history;

    // Only the step that triggers the break may tick upwards.
    let checked = if outcome.report.converged {
        history.len() - 1
    } else {
        history.len()
    };
    for pair in history[..checked].windows(2) {
        assert!(pair[1] <= pair[0], "sse rose from {} to {}", pair[0], pair[1]);
    }
}

#[test]
fn empty_check_stops_after_first_clean_iteration() {
    let x = clustered_patches(6, 2, 10, 3);
    let mut rng = StdRng::seed_from_u64(17);
    let outcome = DictionaryLearner::new(8).learn(&x.view(), &mut rng).unwrap();
    let counts = &outcome.report.empty_atoms;
    assert!(!counts.is_empty());
    // Counts are recorded until (and including) the first zero, never after it.
    if let Some(first_zero) = counts.iter().position(|&n| n == 0) {
        assert_eq!(first_zero, counts.len() - 1);
    }
}

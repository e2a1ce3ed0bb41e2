use ndarray::{Array2, ArrayView2, ArrayViewMut1, Axis};
use rayon::prelude::*;

/// Hard, signed top-1 assignment `S = Dᵀ · X`.
///
/// Every column of the `K × N` result keeps only its entry of largest
/// absolute value (earliest index on ties); all other entries are zero.
pub fn assign_top1(dictionary: &ArrayView2<f64>, x: &ArrayView2<f64>) -> Array2<f64> {
    let mut s = dictionary.t().dot(x);
    s.axis_iter_mut(Axis(1))
        .into_par_iter()
        .for_each(keep_max_abs);
    s
}

fn keep_max_abs(mut col: ArrayViewMut1<f64>) {
    let mut best = 0;
    let mut best_abs = f64::NEG_INFINITY;
    for (i, v) in col.iter().enumerate() {
        if v.abs() > best_abs {
            best_abs = v.abs();
            best = i;
        }
    }
    for (i, v) in col.iter_mut().enumerate() {
        if i != best {
            *v = 0.0;
        }
    }
}

/// Indices of atoms (rows of `s`) that received no patch.
pub fn empty_atoms(s: &ArrayView2<f64>) -> Vec<usize> {
    s.axis_iter(Axis(0))
        .enumerate()
        .filter(|(_, row)| row.iter().all(|&v| v == 0.0))
        .map(|(k, _)| k)
        .collect()
}

use ndarray::{Array2, ArrayViewMut1, Axis};
use rayon::prelude::*;

/// Regularizer added to the per-patch variance before rescaling.
pub const CONTRAST_EPS: f64 = 10.0;

/// Centres `v` on its own mean and divides by `sqrt(var + CONTRAST_EPS)`.
pub fn contrast_normalize(mut v: ArrayViewMut1<f64>) {
    let len = v.len();
    if len == 0 {
        return;
    }
    let mean = v.sum() / len as f64;
    v.mapv_inplace(|a| a - mean);
    let norm_sq = v.dot(&v);
    let scale = 1.0 / (norm_sq / len as f64 + CONTRAST_EPS).sqrt();
    v.mapv_inplace(|a| a * scale);
}

/// Contrast-normalizes every column of `x`.
pub fn contrast_normalize_columns(x: &mut Array2<f64>) {
    x.axis_iter_mut(Axis(1))
        .into_par_iter()
        .for_each(contrast_normalize);
}

/// Scales `v` to unit L2 norm. A zero vector is left untouched.
pub fn unit_normalize(mut v: ArrayViewMut1<f64>) {
    let norm = v.dot(&v).sqrt();
    if norm != 0.0 {
        v.mapv_inplace(|a| a / norm);
    }
}

/// Scales every column of `x` to unit L2 norm, skipping zero columns.
pub fn unit_normalize_columns(x: &mut Array2<f64>) {
    x.axis_iter_mut(Axis(1))
        .into_par_iter()
        .for_each(unit_normalize);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    #[test]
    fn contrast_normalized_vector_has_zero_mean() {
        let mut v: Array1<f64> = array![10.0, 20.0, 30.0, 60.0];
        contrast_normalize(v.view_mut());
        assert_abs_diff_eq!(v.sum(), 0.0, epsilon = 1e-12);

        // centered = [-20, -10, 0, 30], |c|^2 / 4 = 350
        let expected = -20.0 / (350.0f64 + 10.0).sqrt();
        assert_abs_diff_eq!(v[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn constant_vector_becomes_zero() {
        let mut v: Array1<f64> = Array1::from_elem(12, 200.0);
        contrast_normalize(v.view_mut());
        assert!(v.iter().all(|&a| a == 0.0));
    }

    #[test]
    fn unit_columns_and_zero_column() {
        let mut x = array![[3.0, 0.0], [4.0, 0.0]];
        unit_normalize_columns(&mut x);
        assert_abs_diff_eq!(x[[0, 0]], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(x[[1, 0]], 0.8, epsilon = 1e-12);
        assert_eq!(x[[0, 1]], 0.0);
        assert_eq!(x[[1, 1]], 0.0);
    }
}

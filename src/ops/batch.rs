use ndarray::{Array1, ArrayView2, Axis};

/// Squared L2 norm of every column.
/// x: A 2D array of shape (dim, num_vectors).
pub fn column_norm_sq(x: &ArrayView2<f64>) -> Array1<f64> {
    x.map_axis(Axis(0), |col| col.dot(&col))
}

/// Mean of every row, i.e. the mean column vector.
pub fn column_mean(x: &ArrayView2<f64>) -> Array1<f64> {
    let n = x.ncols().max(1) as f64;
    x.sum_axis(Axis(1)) / n
}

/// Squared Frobenius norm.
pub fn frobenius_sq(x: &ArrayView2<f64>) -> f64 {
    x.iter().map(|v| v * v).sum()
}

//! PCA whitening of the training patch matrix.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use tracing::debug;

use crate::error::{FeatureError, Result};
use crate::ops::column_mean;

/// Regularizer added to every eigenvalue before the inverse square root.
pub const WHITEN_EPS: f64 = 0.1;

/// Symmetric whitening operator `W = V · diag(1/sqrt(λ + ε)) · Vᵀ`.
#[derive(Debug, Clone)]
pub struct WhiteningTransform {
    operator: Array2<f64>,
    eigenvalues: Array1<f64>,
}

impl WhiteningTransform {
    pub fn operator(&self) -> &Array2<f64> {
        &self.operator
    }

    /// Eigenvalues of the patch covariance, in solver order.
    pub fn eigenvalues(&self) -> &Array1<f64> {
        &self.eigenvalues
    }

    /// Returns `W · x`.
    pub fn apply(&self, x: &ArrayView2<f64>) -> Array2<f64> {
        self.operator.dot(x)
    }
}

/// Computes whitening transforms from patch matrices.
#[derive(Debug, Clone, Copy)]
pub struct Whitener {
    epsilon: f64,
}

impl Default for Whitener {
    fn default() -> Self {
        Self {
            epsilon: WHITEN_EPS,
        }
    }
}

impl Whitener {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Covariance `(1/N) · C · Cᵀ` of the mean-centred columns of `x`.
    pub fn covariance(x: &ArrayView2<f64>) -> Array2<f64> {
        debug!("calculating mean value for each patch entry");
        let mean = column_mean(x);

        debug!("centering patch matrix");
        let centered = x - &mean.insert_axis(Axis(1));

        debug!("calculating covariance matrix");
        let n = x.ncols().max(1) as f64;
        centered.dot(&centered.t()) / n
    }

    /// Eigendecomposes the patch covariance and builds the whitening operator.
    pub fn fit(&self, x: &ArrayView2<f64>) -> Result<WhiteningTransform> {
        let cov = Self::covariance(x);
        let dim = cov.nrows();
        if cov.iter().any(|v| !v.is_finite()) {
            return Err(FeatureError::Numerical(
                "patch covariance contains non-finite entries".to_string(),
            ));
        }

        debug!(dim, "performing eigenvalue decomposition");
        let matrix = DMatrix::from_fn(dim, dim, |i, j| cov[[i, j]]);
        let max_sweeps = (50 * dim).max(1000);
        let eigen = SymmetricEigen::try_new(matrix, f64::EPSILON, max_sweeps).ok_or_else(|| {
            FeatureError::Numerical(format!(
                "symmetric eigendecomposition of {}x{} covariance did not converge",
                dim, dim
            ))
        })?;

        let eigenvalues = Array1::from_iter(eigen.eigenvalues.iter().copied());
        let vectors = Array2::from_shape_fn((dim, dim), |(i, j)| eigen.eigenvectors[(i, j)]);
        let scales = eigenvalues.mapv(|lambda| 1.0 / (lambda + self.epsilon).sqrt());

        // V · diag(s) scales column j of V by s[j].
        let scaled = &vectors * &scales.view().insert_axis(Axis(0));
        let operator = scaled.dot(&vectors.t());

        Ok(WhiteningTransform {
            operator,
            eigenvalues,
        })
    }

    /// Fits on `x` and returns the whitened matrix.
    ///
    /// The operator multiplies the uncentred patches.
    pub fn whiten(&self, x: &ArrayView2<f64>) -> Result<Array2<f64>> {
        let transform = self.fit(x)?;
        debug!("whitening data");
        Ok(transform.apply(x))
    }
}

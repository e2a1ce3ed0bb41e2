//! # Dense-grid feature extraction
//!
//! Every image is cut into a stride grid of patches, each patch is
//! contrast-normalized and projected onto the dictionary atoms, and the
//! rectified activations are summed inside square pools.
//!
//! Patches are *not* whitened here, even though the atoms were learned in
//! whitened space; only the contrast normalization of the training patches is
//! repeated.

pub mod pooling;

use ndarray::{Array1, Array2};
use tracing::debug;

use crate::config::GridGeometry;
use crate::dictionary::Dictionary;
use crate::error::ConfigError;
use crate::image::Image;
use crate::ops::contrast_normalize_columns;

pub use self::pooling::rectified_sum_pool;

/// Turns images into pooled feature vectors with a fixed dictionary.
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor<'d> {
    dictionary: &'d Dictionary,
    geometry: GridGeometry,
}

impl<'d> FeatureExtractor<'d> {
    pub fn new(dictionary: &'d Dictionary) -> Result<Self, ConfigError> {
        let geometry = dictionary.geometry()?;
        Ok(Self {
            dictionary,
            geometry,
        })
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn feature_len(&self) -> usize {
        self.geometry.feature_len()
    }

    /// Checks that `image` matches the recorded training size.
    pub fn check_image(&self, reference: &str, image: &Image) -> Result<(), ConfigError> {
        if !image.is_square() {
            return Err(ConfigError::NonSquareImage {
                image: reference.to_string(),
                width: image.width(),
                height: image.height(),
            });
        }
        if image.width() != self.geometry.image_size {
            return Err(ConfigError::SizeMismatch {
                image: reference.to_string(),
                expected: self.geometry.image_size,
                found: image.width(),
            });
        }
        Ok(())
    }

    /// Contrast-normalized grid patches as columns, in pool-major order.
    ///
    /// `reference` names the image in size errors.
    pub fn extract_patches(&self, reference: &str, image: &Image) -> Result<Array2<f64>, ConfigError> {
        self.check_image(reference, image)?;
        let origins = self.geometry.patch_origins();
        let mut patches = Array2::zeros((self.geometry.patch_len(), origins.len()));
        for (col, &(x, y)) in origins.iter().enumerate() {
            patches
                .column_mut(col)
                .assign(&image.patch_vector(x, y, self.geometry.crop_size));
        }
        contrast_normalize_columns(&mut patches);
        Ok(patches)
    }

    /// Raw activations `Dᵀ · P`, one column per patch.
    pub fn activations(&self, patches: &Array2<f64>) -> Array2<f64> {
        self.dictionary.atoms().t().dot(patches)
    }

    pub fn extract(&self, reference: &str, image: &Image) -> Result<Array1<f64>, ConfigError> {
        debug!(image = reference, "extracting patches");
        let patches = self.extract_patches(reference, image)?;

        debug!("applying dictionary to patches");
        let activations = self.activations(&patches);

        debug!("pooling features");
        let pool_area = self.geometry.pool_size * self.geometry.pool_size;
        Ok(rectified_sum_pool(&activations.view(), pool_area))
    }
}

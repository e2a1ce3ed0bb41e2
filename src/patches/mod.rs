//! Random patch sampling for dictionary training.

use ndarray::Array2;
use rand::Rng;
use tracing::debug;

use crate::config::FilterConfig;
use crate::error::ConfigError;
use crate::image::Image;
use crate::ops::contrast_normalize;

/// Draws contrast-normalized training patches.
#[derive(Debug, Clone, Copy)]
pub struct PatchSampler {
    crop_size: usize,
    patches_per_image: usize,
}

impl PatchSampler {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            crop_size: config.crop_size,
            patches_per_image: config.patches_per_image,
        }
    }

    pub fn patch_len(&self) -> usize {
        crate::config::CHANNELS * self.crop_size * self.crop_size
    }

    /// Samples `patches_per_image` patches from every image.
    ///
    /// Returns the `L × (patches_per_image · images.len())` patch matrix; the
    /// columns of image `i` occupy `i * p .. (i + 1) * p`. Offsets are drawn as
    /// `x` then `y`, both uniform over the valid range.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        images: &[Image],
        rng: &mut R,
    ) -> Result<Array2<f64>, ConfigError> {
        let num_patches = self.patches_per_image * images.len();
        let mut x = Array2::zeros((self.patch_len(), num_patches));
        debug!(
            images = images.len(),
            num_patches,
            patch_len = self.patch_len(),
            "sampling training patches"
        );

        let mut col_index = 0;
        for image in images {
            if self.crop_size > image.width() || self.crop_size > image.height() {
                return Err(ConfigError::CropTooLarge {
                    crop_size: self.crop_size,
                    image_size: image.width().min(image.height()),
                });
            }
            let x_max = 1 + image.width() - self.crop_size;
            let y_max = 1 + image.height() - self.crop_size;
            for _ in 0..self.patches_per_image {
                let px = rng.gen_range(0..x_max);
                let py = rng.gen_range(0..y_max);
                let mut patch = image.patch_vector(px, py, self.crop_size);
                contrast_normalize(patch.view_mut());
                x.column_mut(col_index).assign(&patch);
                col_index += 1;
            }
        }

        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gradient_image(size: usize) -> Image {
        Image::from_fn(size, size, |x, y| [(x * 10) as u8, (y * 10) as u8, ((x + y) * 5) as u8])
    }

    fn sampler(crop_size: usize, patches_per_image: usize) -> PatchSampler {
        PatchSampler::new(&FilterConfig {
            crop_size,
            patches_per_image,
            ..FilterConfig::default()
        })
    }

    #[test]
    fn matrix_has_one_column_per_patch() {
        let images = vec![gradient_image(10), gradient_image(10), gradient_image(10)];
        let mut rng = StdRng::seed_from_u64(1);
        let x = sampler(4, 5).sample(&images, &mut rng).unwrap();
        assert_eq!(x.dim(), (48, 15));
    }

    #[test]
    fn columns_are_centered() {
        let images = vec![gradient_image(12)];
        let mut rng = StdRng::seed_from_u64(3);
        let x = sampler(5, 8).sample(&images, &mut rng).unwrap();
        for col in x.columns() {
            assert_abs_diff_eq!(col.sum(), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn same_seed_same_patches() {
        let images = vec![gradient_image(16), gradient_image(16)];
        let a = sampler(4, 6)
            .sample(&images, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = sampler(4, 6)
            .sample(&images, &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn full_image_crop_is_deterministic_patch() {
        let image = Image::filled(3, 3, [255, 0, 0]);
        let mut rng = StdRng::seed_from_u64(9);
        let x = sampler(3, 2).sample(&[image.clone()], &mut rng).unwrap();
        let mut expected = image.patch_vector(0, 0, 3);
        contrast_normalize(expected.view_mut());
        assert_eq!(x.column(0), expected);
        assert_eq!(x.column(1), expected);
    }

    #[test]
    fn crop_larger_than_image_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = sampler(8, 1)
            .sample(&[gradient_image(4)], &mut rng)
            .unwrap_err();
        assert!(matches!(err, ConfigError::CropTooLarge { .. }));
    }
}

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of colour channels in every patch.
pub const CHANNELS: usize = 3;

/// Filter settings, fixed for a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Seed of the single random stream used for sampling and k-means.
    pub seed: u64,

    /// Width and height of each patch in pixels.
    pub crop_size: usize,

    /// Patches drawn from every training image.
    pub patches_per_image: usize,

    /// Number of dictionary atoms (K).
    pub num_atoms: usize,

    /// Grid step between patches at extraction time.
    pub stride: usize,

    /// Width and height of a pooling block, in grid patches.
    pub pool_size: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            crop_size: 8,
            patches_per_image: 1,
            num_atoms: 1000,
            stride: 4,
            pool_size: 2,
        }
    }
}

impl FilterConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Length of a flattened, channel-major patch vector.
    pub fn patch_len(&self) -> usize {
        CHANNELS * self.crop_size * self.crop_size
    }

    /// Checks the parameters that do not depend on the image size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("crop_size", self.crop_size),
            ("patches_per_image", self.patches_per_image),
            ("num_atoms", self.num_atoms),
            ("stride", self.stride),
            ("pool_size", self.pool_size),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(ConfigError::ZeroParameter { name });
            }
        }
        Ok(())
    }

    /// Validates the extraction grid for square images of `image_size`.
    pub fn geometry_for(&self, image_size: usize) -> Result<GridGeometry, ConfigError> {
        self.validate()?;
        if self.crop_size > image_size {
            return Err(ConfigError::CropTooLarge {
                crop_size: self.crop_size,
                image_size,
            });
        }
        let span = image_size - self.crop_size;
        if span % self.stride != 0 {
            return Err(ConfigError::StrideIncompatible {
                image_size,
                crop_size: self.crop_size,
                stride: self.stride,
            });
        }
        let grid_dim = 1 + span / self.stride;
        if grid_dim % self.pool_size != 0 {
            return Err(ConfigError::PoolIncompatible {
                grid_dim,
                pool_size: self.pool_size,
            });
        }

        Ok(GridGeometry {
            image_size,
            crop_size: self.crop_size,
            stride: self.stride,
            pool_size: self.pool_size,
            num_atoms: self.num_atoms,
            grid_dim,
        })
    }
}

/// Dense extraction grid derived from a validated [`FilterConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub image_size: usize,
    pub crop_size: usize,
    pub stride: usize,
    pub pool_size: usize,
    pub num_atoms: usize,
    /// Patches per image dimension.
    pub grid_dim: usize,
}

impl GridGeometry {
    pub fn pools_per_dim(&self) -> usize {
        self.grid_dim / self.pool_size
    }

    pub fn num_pools(&self) -> usize {
        self.pools_per_dim() * self.pools_per_dim()
    }

    pub fn patches_per_image(&self) -> usize {
        self.grid_dim * self.grid_dim
    }

    pub fn patch_len(&self) -> usize {
        CHANNELS * self.crop_size * self.crop_size
    }

    pub fn feature_len(&self) -> usize {
        self.num_pools() * self.num_atoms
    }

    /// Pixel origins `(x, y)` of every grid patch, pool-major.
    ///
    /// Pools are visited row-major over `(pool_x, pool_y)`, and inside each pool
    /// the local offsets `(local_x, local_y)` are visited row-major as well.
    pub fn patch_origins(&self) -> Vec<(usize, usize)> {
        let pools = self.pools_per_dim();
        let mut origins = Vec::with_capacity(self.patches_per_image());
        for pool_x in 0..pools {
            for pool_y in 0..pools {
                for local_x in 0..self.pool_size {
                    for local_y in 0..self.pool_size {
                        let x = (pool_x * self.pool_size + local_x) * self.stride;
                        let y = (pool_y * self.pool_size + local_y) * self.stride;
                        origins.push((x, y));
                    }
                }
            }
        }
        origins
    }
}

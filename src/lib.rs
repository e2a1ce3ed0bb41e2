//! # patch_kmeans
//!
//! Unsupervised image features from a learned patch dictionary.
//!
//! [`fit`] samples random patches from a batch of same-sized square RGB
//! images, contrast-normalizes and PCA-whitens them, and learns `K` unit-norm
//! atoms with spherical k-means. [`transform`] slides a dense stride grid over
//! every image, projects each patch onto the atoms and sum-pools the rectified
//! responses over square blocks of the grid, giving one feature vector per
//! image.
//!
//! ```no_run
//! use patch_kmeans::{fit, transform, FilterConfig, Image, InMemoryImageSource, Row};
//!
//! # fn main() -> patch_kmeans::Result<()> {
//! let source = InMemoryImageSource::new()
//!     .with_image("a", Image::filled(20, 20, [200, 40, 90]))
//!     .with_image("b", Image::filled(20, 20, [10, 140, 30]));
//! let rows = vec![Row::new("a", Some(0.0)), Row::new("b", Some(1.0))];
//! let config = FilterConfig { num_atoms: 16, ..FilterConfig::default() };
//!
//! let dictionary = fit(&config, &rows, &source)?;
//! let table = transform(&rows, &dictionary, &source)?;
//! assert_eq!(table.num_features(), 4 * 16);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dataset;
pub mod dictionary;
pub mod error;
pub mod features;
pub mod image;
pub mod kmeans;
pub mod ops;
pub mod patches;
pub mod pipeline;
pub mod whitening;

#[cfg(feature = "python")]
pub mod bindings;

pub use config::{FilterConfig, GridGeometry};
pub use dataset::{FeatureRow, FeatureTable, Row};
pub use dictionary::Dictionary;
pub use error::{ConfigError, DecodeError, FeatureError, Result};
pub use features::FeatureExtractor;
pub use image::{Image, ImageSource, InMemoryImageSource};
pub use kmeans::{DictionaryLearner, TrainingReport};
pub use patches::PatchSampler;
pub use pipeline::{fit, fit_transform, fit_with_rng, transform};
pub use whitening::{WhiteningTransform, Whitener};

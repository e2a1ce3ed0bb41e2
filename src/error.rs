//! Error taxonomy for the filter.
//!
//! Configuration problems are detected before any numeric work starts, decode
//! failures carry the offending image reference, and numerical failures come
//! from the whitening eigensolver.

use thiserror::Error;

/// Violated configuration or geometry condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be at least 1")]
    ZeroParameter { name: &'static str },

    #[error("image {image} is not square ({width}x{height})")]
    NonSquareImage {
        image: String,
        width: usize,
        height: usize,
    },

    #[error("image {image} has size {found}, expected {expected}")]
    SizeMismatch {
        image: String,
        expected: usize,
        found: usize,
    },

    #[error("crop size {crop_size} exceeds image size {image_size}")]
    CropTooLarge { crop_size: usize, image_size: usize },

    #[error("image size {image_size} not compatible with crop size {crop_size} and stride {stride}")]
    StrideIncompatible {
        image_size: usize,
        crop_size: usize,
        stride: usize,
    },

    #[error("pool size {pool_size} does not divide the {grid_dim} patches per dimension")]
    PoolIncompatible { grid_dim: usize, pool_size: usize },

    #[error("no training image could be decoded")]
    EmptyTrainingSet,

    #[error("dictionary has shape {found:?}, expected {expected:?}")]
    DictionaryShape {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// An image reference that the [`ImageSource`](crate::image::ImageSource)
/// could not turn into pixels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("image {reference} could not be read: {reason}")]
pub struct DecodeError {
    pub reference: String,
    pub reason: String,
}

impl DecodeError {
    pub fn new(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error("dictionary serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("dictionary i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FeatureError>;

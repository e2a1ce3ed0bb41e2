//! Decoded RGB pixel grids and the collaborator that produces them.
//!
//! Codecs live outside this crate: anything able to hand back 8-bit RGB
//! pixels for an image reference can implement [`ImageSource`].

use std::collections::HashMap;

use ndarray::{Array1, Array3};

use crate::config::CHANNELS;
use crate::error::DecodeError;

/// An 8-bit RGB image, stored as `(height, width, channel)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pixels: Array3<u8>,
}

impl Image {
    /// Wraps interleaved RGB bytes in row-major pixel order.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, DecodeError> {
        let expected = width * height * CHANNELS;
        if data.len() != expected {
            return Err(DecodeError::new(
                "<raw>",
                format!("expected {} bytes for {}x{} RGB, got {}", expected, width, height, data.len()),
            ));
        }
        Array3::from_shape_vec((height, width, CHANNELS), data)
            .map(|pixels| Self { pixels })
            .map_err(|e| DecodeError::new("<raw>", e.to_string()))
    }

    pub fn from_pixels(pixels: Array3<u8>) -> Result<Self, DecodeError> {
        if pixels.dim().2 != CHANNELS {
            return Err(DecodeError::new(
                "<array>",
                format!("expected {} channels, got {}", CHANNELS, pixels.dim().2),
            ));
        }
        Ok(Self { pixels })
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> [u8; 3],
    {
        let pixels = Array3::from_shape_fn((height, width, CHANNELS), |(y, x, c)| f(x, y)[c]);
        Self { pixels }
    }

    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        Self::from_fn(width, height, |_, _| rgb)
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn is_square(&self) -> bool {
        self.width() == self.height()
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        [
            self.pixels[[y, x, 0]],
            self.pixels[[y, x, 1]],
            self.pixels[[y, x, 2]],
        ]
    }

    /// Flattens the `crop`×`crop` block with top-left corner `(x, y)`.
    ///
    /// Layout is channel-major: every red sample in row-major order, then all
    /// green samples, then all blue samples.
    pub fn patch_vector(&self, x: usize, y: usize, crop: usize) -> Array1<f64> {
        let plane = crop * crop;
        let mut vec = Array1::zeros(CHANNELS * plane);
        let mut index = 0;
        for row in y..y + crop {
            for col in x..x + crop {
                for c in 0..CHANNELS {
                    vec[c * plane + index] = f64::from(self.pixels[[row, col, c]]);
                }
                index += 1;
            }
        }
        vec
    }
}

/// Resolves image references to decoded pixels.
pub trait ImageSource {
    fn load(&self, reference: &str) -> Result<Image, DecodeError>;
}

impl<F> ImageSource for F
where
    F: Fn(&str) -> Result<Image, DecodeError>,
{
    fn load(&self, reference: &str) -> Result<Image, DecodeError> {
        self(reference)
    }
}

/// Images kept in memory under their reference string.
#[derive(Debug, Clone, Default)]
pub struct InMemoryImageSource {
    images: HashMap<String, Image>,
}

impl InMemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, image: Image) -> Option<Image> {
        self.images.insert(reference.into(), image)
    }

    pub fn with_image(mut self, reference: impl Into<String>, image: Image) -> Self {
        self.insert(reference, image);
        self
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSource for InMemoryImageSource {
    fn load(&self, reference: &str) -> Result<Image, DecodeError> {
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| DecodeError::new(reference, "no such image"))
    }
}

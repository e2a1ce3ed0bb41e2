//! The learned dictionary and its on-disk form.

use std::fs;
use std::path::Path;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{FilterConfig, GridGeometry};
use crate::error::{ConfigError, Result};
use crate::kmeans::TrainingReport;

/// `L × K` matrix of unit-norm atoms plus the settings it was learned with.
///
/// Immutable once built; extraction borrows it read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dictionary {
    config: FilterConfig,
    image_size: usize,
    atoms: Array2<f64>,
    report: TrainingReport,
}

impl Dictionary {
    pub fn new(
        config: FilterConfig,
        image_size: usize,
        atoms: Array2<f64>,
        report: TrainingReport,
    ) -> std::result::Result<Self, ConfigError> {
        let dictionary = Self {
            config,
            image_size,
            atoms,
            report,
        };
        dictionary.validate()?;
        Ok(dictionary)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.config.geometry_for(self.image_size)?;
        let expected = (self.config.patch_len(), self.config.num_atoms);
        if self.atoms.dim() != expected {
            return Err(ConfigError::DictionaryShape {
                expected,
                found: self.atoms.dim(),
            });
        }
        Ok(())
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Side length of the square training images.
    pub fn image_size(&self) -> usize {
        self.image_size
    }

    pub fn atoms(&self) -> &Array2<f64> {
        &self.atoms
    }

    pub fn atom(&self, k: usize) -> ArrayView1<'_, f64> {
        self.atoms.column(k)
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.ncols()
    }

    pub fn patch_len(&self) -> usize {
        self.atoms.nrows()
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn geometry(&self) -> std::result::Result<GridGeometry, ConfigError> {
        self.config.geometry_for(self.image_size)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let dictionary: Self = serde_json::from_str(text)?;
        dictionary.validate()?;
        Ok(dictionary)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        debug!(path = %path.as_ref().display(), "saving dictionary");
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "loading dictionary");
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatureError;

    fn small_config() -> FilterConfig {
        FilterConfig {
            crop_size: 2,
            num_atoms: 3,
            stride: 1,
            pool_size: 1,
            ..FilterConfig::default()
        }
    }

    fn small_dictionary() -> Dictionary {
        let atoms = Array2::from_shape_fn((12, 3), |(i, k)| if i == k { 1.0 } else { 0.0 });
        Dictionary::new(small_config(), 4, atoms, TrainingReport::default()).unwrap()
    }

    #[test]
    fn shape_must_match_config() {
        let err = Dictionary::new(
            small_config(),
            4,
            Array2::zeros((12, 2)),
            TrainingReport::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DictionaryShape {
                expected: (12, 3),
                found: (12, 2)
            }
        );
    }

    #[test]
    fn json_round_trip_preserves_atoms() {
        let dictionary = small_dictionary();
        let restored = Dictionary::from_json(&dictionary.to_json().unwrap()).unwrap();
        assert_eq!(restored, dictionary);
        assert_eq!(restored.atom(1)[1], 1.0);
    }

    #[test]
    fn tampered_json_is_rejected() {
        let text = small_dictionary()
            .to_json()
            .unwrap()
            .replace("\"num_atoms\":3", "\"num_atoms\":4");
        let err = Dictionary::from_json(&text).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::Configuration(ConfigError::DictionaryShape { .. })
        ));
    }

    #[test]
    fn save_and_load() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dictionary.json");
        let dictionary = small_dictionary();
        dictionary.save(&path)?;
        assert_eq!(Dictionary::load(&path)?, dictionary);
        Ok(())
    }
}

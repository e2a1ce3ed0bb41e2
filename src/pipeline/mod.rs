//! # Two-phase filter pipeline
//!
//! [`fit`] learns a [`Dictionary`] from a batch of rows; [`transform`] turns
//! any batch of rows into a [`FeatureTable`] with that dictionary.
//! [`fit_transform`] does both on the same rows.


use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::FilterConfig;
use crate::dataset::{FeatureRow, FeatureTable, Row};
use crate::dictionary::Dictionary;
use crate::error::{ConfigError, Result};
use crate::features::FeatureExtractor;
use crate::image::{Image, ImageSource};
use crate::kmeans::DictionaryLearner;
use crate::patches::PatchSampler;
use crate::whitening::Whitener;

/// Learns a dictionary with a random stream seeded from `config.seed`.
pub fn fit<S>(config: &FilterConfig, rows: &[Row], source: &S) -> Result<Dictionary>
where
    S: ImageSource + ?Sized,
{
    let mut rng = StdRng::seed_from_u64(config.seed);
    fit_with_rng(config, rows, source, &mut rng)
}

/// Learns a dictionary, drawing every random number from `rng`.
///
/// Rows whose image cannot be decoded are skipped. All decoded images must be
/// square and share one size, and the grid geometry is checked against that
/// size before any patch is sampled.
pub fn fit_with_rng<S, R>(
    config: &FilterConfig,
    rows: &[Row],
    source: &S,
    rng: &mut R,
) -> Result<Dictionary>
where
    S: ImageSource + ?Sized,
    R: Rng + ?Sized,
{
    config.validate()?;

    let images = load_training_images(rows, source)?;
    let image_size = images[0].width();
    let geometry = config.geometry_for(image_size)?;
    debug!(
        image_size,
        grid_dim = geometry.grid_dim,
        feature_len = geometry.feature_len(),
        "grid geometry"
    );

    let patches = PatchSampler::new(config).sample(&images, rng)?;

    debug!("whitening patches");
    let whitened = Whitener::default().whiten(&patches.view())?;

    let outcome = DictionaryLearner::from_config(config).learn(&whitened.view(), rng)?;
    info!(
        images = images.len(),
        skipped = rows.len() - images.len(),
        num_atoms = config.num_atoms,
        "dictionary learned"
    );

    Ok(Dictionary::new(
        config.clone(),
        image_size,
        outcome.atoms,
        outcome.report,
    )?)
}

fn load_training_images<S>(rows: &[Row], source: &S) -> Result<Vec<Image>>
where
    S: ImageSource + ?Sized,
{
    let mut images: Vec<Image> = Vec::with_capacity(rows.len());
    for row in rows {
        let image = match source.load(&row.image) {
            Ok(image) => image,
            Err(err) => {
                warn!(image = %row.image, error = %err, "skipping training image");
                continue;
            }
        };
        if !image.is_square() {
            return Err(ConfigError::NonSquareImage {
                image: row.image.clone(),
                width: image.width(),
                height: image.height(),
            }
            .into());
        }
        if let Some(first) = images.first() {
            if image.width() != first.width() {
                return Err(ConfigError::SizeMismatch {
                    image: row.image.clone(),
                    expected: first.width(),
                    found: image.width(),
                }
                .into());
            }
        }
        images.push(image);
    }

    if images.is_empty() {
        return Err(ConfigError::EmptyTrainingSet.into());
    }
    Ok(images)
}

/// Feature vectors for every row, in input order.
///
/// Unlike training, an image that cannot be decoded fails the whole batch.
pub fn transform<S>(rows: &[Row], dictionary: &Dictionary, source: &S) -> Result<FeatureTable>
where
    S: ImageSource + ?Sized,
{
    let extractor = FeatureExtractor::new(dictionary)?;
    let mut table = FeatureTable::with_capacity(extractor.feature_len(), rows.len());
    debug!(
        rows = rows.len(),
        attributes = table.attributes().len(),
        "output format"
    );

    for row in rows {
        let image = source.load(&row.image)?;
        let features = extractor.extract(&row.image, &image)?;
        table.push(FeatureRow {
            features,
            label: row.label,
            weight: row.weight,
        });
    }

    info!(rows = table.len(), features = extractor.feature_len(), "feature table built");
    Ok(table)
}

/// [`fit`] followed by [`transform`] on the same rows.
pub fn fit_transform<S>(
    config: &FilterConfig,
    rows: &[Row],
    source: &S,
) -> Result<(Dictionary, FeatureTable)>
where
    S: ImageSource + ?Sized,
{
    let dictionary = fit(config, rows, source)?;
    let table = transform(rows, &dictionary, source)?;
    Ok((dictionary, table))
}

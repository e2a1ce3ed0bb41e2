//! # `KMeansImageFilter` Python class
//!
//! Images come in as one `uint8` array shaped `(N, S, S, 3)`; row `i` is
//! referenced by its index. Features go out as an `(N, F)` float array.

use ndarray::{Array1, Array2, ArrayView4, Axis};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray4};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::FilterConfig;
use crate::dataset::{FeatureTable, Row};
use crate::dictionary::Dictionary;
use crate::error::FeatureError;
use crate::image::{Image, InMemoryImageSource};
use crate::pipeline;

fn to_py_err(err: FeatureError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn batch(
    images: ArrayView4<'_, u8>,
    labels: Option<PyReadonlyArray1<'_, f64>>,
) -> PyResult<(InMemoryImageSource, Vec<Row>)> {
    let labels = labels.map(|l| l.as_array().to_owned());
    if let Some(labels) = &labels {
        if labels.len() != images.len_of(Axis(0)) {
            return Err(PyValueError::new_err(format!(
                "got {} labels for {} images",
                labels.len(),
                images.len_of(Axis(0))
            )));
        }
    }

    let mut source = InMemoryImageSource::new();
    let mut rows = Vec::with_capacity(images.len_of(Axis(0)));
    for (i, pixels) in images.axis_iter(Axis(0)).enumerate() {
        let image = Image::from_pixels(pixels.to_owned())
            .map_err(|err| to_py_err(err.into()))?;
        let reference = i.to_string();
        source.insert(reference.clone(), image);
        rows.push(Row::new(reference, labels.as_ref().map(|l| l[i])));
    }
    Ok((source, rows))
}

fn feature_matrix(table: &FeatureTable) -> Array2<f64> {
    let mut out = Array2::zeros((table.len(), table.num_features()));
    for (mut dst, row) in out.rows_mut().into_iter().zip(table.rows()) {
        dst.assign(&row.features);
    }
    out
}

#[pyclass(name = "KMeansImageFilter", module = "patch_kmeans")]
pub struct PyKMeansImageFilter {
    config: FilterConfig,
    dictionary: Option<Dictionary>,
}

impl PyKMeansImageFilter {
    fn fitted(&self) -> PyResult<&Dictionary> {
        self.dictionary
            .as_ref()
            .ok_or_else(|| PyValueError::new_err("filter has not been fitted"))
    }
}

#[pymethods]
impl PyKMeansImageFilter {
    #[new]
    #[pyo3(signature = (seed=0, crop_size=8, patches_per_image=1, k=1000, stride=4, pool_size=2))]
    fn new(
        seed: u64,
        crop_size: usize,
        patches_per_image: usize,
        k: usize,
        stride: usize,
        pool_size: usize,
    ) -> PyResult<Self> {
        let config = FilterConfig {
            seed,
            crop_size,
            patches_per_image,
            num_atoms: k,
            stride,
            pool_size,
        };
        config
            .validate()
            .map_err(|err| to_py_err(err.into()))?;
        Ok(Self {
            config,
            dictionary: None,
        })
    }

    #[getter]
    fn is_fitted(&self) -> bool {
        self.dictionary.is_some()
    }

    #[pyo3(signature = (images, labels=None))]
    fn fit(
        &mut self,
        py: Python<'_>,
        images: PyReadonlyArray4<u8>,
        labels: Option<PyReadonlyArray1<f64>>,
    ) -> PyResult<()> {
        let (source, rows) = batch(images.as_array(), labels)?;
        let config = &self.config;
        let dictionary = py
            .allow_threads(|| pipeline::fit(config, &rows, &source))
            .map_err(to_py_err)?;
        self.dictionary = Some(dictionary);
        Ok(())
    }

    /// Returns the `(N, F)` feature matrix.
    fn transform<'py>(
        &self,
        py: Python<'py>,
        images: PyReadonlyArray4<u8>,
    ) -> PyResult<&'py PyArray2<f64>> {
        let dictionary = self.fitted()?;
        let (source, rows) = batch(images.as_array(), None)?;
        let table = py
            .allow_threads(|| pipeline::transform(&rows, dictionary, &source))
            .map_err(to_py_err)?;
        Ok(feature_matrix(&table).into_pyarray(py))
    }

    #[pyo3(signature = (images, labels=None))]
    fn fit_transform<'py>(
        &mut self,
        py: Python<'py>,
        images: PyReadonlyArray4<u8>,
        labels: Option<PyReadonlyArray1<f64>>,
    ) -> PyResult<&'py PyArray2<f64>> {
        let (source, rows) = batch(images.as_array(), labels)?;
        let config = &self.config;
        let (dictionary, table) = py
            .allow_threads(|| pipeline::fit_transform(config, &rows, &source))
            .map_err(to_py_err)?;
        self.dictionary = Some(dictionary);
        Ok(feature_matrix(&table).into_pyarray(py))
    }

    /// Dictionary atoms as an `(L, K)` array.
    fn atoms<'py>(&self, py: Python<'py>) -> PyResult<&'py PyArray2<f64>> {
        Ok(self.fitted()?.atoms().clone().into_pyarray(py))
    }

    fn sse_history<'py>(&self, py: Python<'py>) -> PyResult<&'py PyArray1<f64>> {
        let history = Array1::from(self.fitted()?.report().sse_history.clone());
        Ok(history.into_pyarray(py))
    }

    fn to_json(&self) -> PyResult<String> {
        self.fitted()?.to_json().map_err(to_py_err)
    }

    #[staticmethod]
    fn from_json(text: &str) -> PyResult<Self> {
        let dictionary = Dictionary::from_json(text).map_err(to_py_err)?;
        Ok(Self {
            config: dictionary.config().clone(),
            dictionary: Some(dictionary),
        })
    }
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_class::<PyKMeansImageFilter>()?;
    Ok(())
}

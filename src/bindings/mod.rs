mod filter;

pub use filter::*;

use pyo3::prelude::*;
use pyo3::types::PyModule;

/// Spherical k-means image patch features
#[pymodule]
pub fn patch_kmeans(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    filter::register(m)?;
    Ok(())
}

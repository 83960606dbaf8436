use pyo3::prelude::*;

use crate::detectors::sta_lta::{sta_lta_batch_py, sta_lta_py};

#[pymodule]
fn fast_trigger(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Register trigger functions with their user-facing names
    m.add_function(wrap_pyfunction!(sta_lta_py, m)?)?;
    m.add_function(wrap_pyfunction!(sta_lta_batch_py, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}

//! # Short-Term-Average / Long-Term-Average (STA/LTA) Trigger Ratio
//!
//! Classic amplitude-based trigger statistic for onset detection in
//! continuous sensor traces. For every sample the trailing short-window mean
//! of absolute amplitude (STA) is divided by the trailing long-window mean
//! (LTA); a ratio rising well above 1 marks a likely transient arrival.
//!
//! Both windows grow from a single sample at the start of the trace until
//! they reach their configured lengths, then slide. Each trace is processed
//! in one linear pass with two running sums, so cost is O(n) regardless of
//! window lengths. Non-finite samples are never rejected: NaN and Infinity
//! flow through the running sums, and the division guard (`LTA > 1e-10`)
//! doubles as the NaN guard since ordered comparisons against NaN are false.
//!
//! ## Parameters
//! - **sta_len**: Short window length in samples (defaults to 10).
//! - **lta_len**: Long window length in samples (defaults to 100).
//!   Must satisfy `0 < sta_len < lta_len <= trace length`.
//!
//! ## Errors
//! - **NonPositiveWindow**: a window length is zero.
//! - **StaNotShorter**: `sta_len >= lta_len`.
//! - **EmptyInput**: the trace (or batch) has no samples or no traces.
//! - **WindowExceedsTrace**: `lta_len` is longer than the trace.
//! - **ShapeMismatch** / **BatchTooLarge**: flat batch buffer does not match
//!   the stated `n_traces x n_samples` dimensions, or the product overflows.
//!
//! ## Returns
//! - **`Ok(StaLtaOutput)`** / **`Ok(StaLtaBatchOutput)`** with one ratio per
//!   input sample, or **`Err(StaLtaError)`** before any output is produced.

#[cfg(feature = "python")]
use numpy::{PyArrayMethods, PyUntypedArrayMethods};
#[cfg(feature = "python")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::utilities::data_loader::{component_slice, Traces};
use aligned_vec::{AVec, CACHELINE_ALIGN};
use rayon::prelude::*;
use thiserror::Error;

/// Baselines at or below this magnitude are treated as silence and map the
/// ratio to 0.0 instead of dividing. NaN baselines fail the comparison and
/// take the same branch.
const LTA_FLOOR: f64 = 1e-10;

#[derive(Debug, Clone)]
pub enum StaLtaData<'a> {
    Traces {
        traces: &'a Traces,
        component: &'a str,
    },
    Slice(&'a [f64]),
}

#[derive(Debug, Clone)]
pub struct StaLtaOutput {
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct StaLtaParams {
    pub sta_len: Option<usize>,
    pub lta_len: Option<usize>,
}

impl Default for StaLtaParams {
    fn default() -> Self {
        Self {
            sta_len: Some(10),
            lta_len: Some(100),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaLtaInput<'a> {
    pub data: StaLtaData<'a>,
    pub params: StaLtaParams,
}

impl<'a> StaLtaInput<'a> {
    #[inline]
    pub fn from_traces(traces: &'a Traces, component: &'a str, params: StaLtaParams) -> Self {
        Self {
            data: StaLtaData::Traces { traces, component },
            params,
        }
    }

    #[inline]
    pub fn from_slice(slice: &'a [f64], params: StaLtaParams) -> Self {
        Self {
            data: StaLtaData::Slice(slice),
            params,
        }
    }

    #[inline]
    pub fn with_default_traces(traces: &'a Traces) -> Self {
        Self::from_traces(traces, "z", StaLtaParams::default())
    }

    #[inline]
    pub fn get_sta_len(&self) -> usize {
        self.params.sta_len.unwrap_or(10)
    }

    #[inline]
    pub fn get_lta_len(&self) -> usize {
        self.params.lta_len.unwrap_or(100)
    }
}

impl<'a> AsRef<[f64]> for StaLtaInput<'a> {
    #[inline(always)]
    fn as_ref(&self) -> &[f64] {
        match &self.data {
            StaLtaData::Traces { traces, component } => component_slice(traces, component),
            StaLtaData::Slice(slice) => slice,
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct StaLtaBuilder {
    sta_len: Option<usize>,
    lta_len: Option<usize>,
}

impl StaLtaBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn sta_len(mut self, len: usize) -> Self {
        self.sta_len = Some(len);
        self
    }

    #[inline]
    pub fn lta_len(mut self, len: usize) -> Self {
        self.lta_len = Some(len);
        self
    }

    #[inline]
    pub fn apply_slice(self, data: &[f64]) -> Result<StaLtaOutput, StaLtaError> {
        let params = StaLtaParams {
            sta_len: self.sta_len,
            lta_len: self.lta_len,
        };
        sta_lta(&StaLtaInput::from_slice(data, params))
    }

    #[inline]
    pub fn apply_traces(self, traces: &Traces, component: &str) -> Result<StaLtaOutput, StaLtaError> {
        let params = StaLtaParams {
            sta_len: self.sta_len,
            lta_len: self.lta_len,
        };
        sta_lta(&StaLtaInput::from_traces(traces, component, params))
    }
}

#[derive(Debug, Error)]
pub enum StaLtaError {
    #[error("sta_lta: Window lengths must be > 0: sta_len = {sta_len}, lta_len = {lta_len}")]
    NonPositiveWindow { sta_len: usize, lta_len: usize },
    #[error("sta_lta: STA length must be < LTA length: sta_len = {sta_len}, lta_len = {lta_len}")]
    StaNotShorter { sta_len: usize, lta_len: usize },
    #[error("sta_lta: Empty input array.")]
    EmptyInput,
    #[error(
        "sta_lta: Window lengths must not exceed trace length: lta_len = {lta_len}, trace length = {trace_len}"
    )]
    WindowExceedsTrace { lta_len: usize, trace_len: usize },
    #[error(
        "sta_lta: Flat buffer of length {len} does not match {n_traces} x {n_samples} batch dimensions."
    )]
    ShapeMismatch {
        len: usize,
        n_traces: usize,
        n_samples: usize,
    },
    #[error("sta_lta: Batch dimensions are too large: {n_traces} x {n_samples} overflows.")]
    BatchTooLarge { n_traces: usize, n_samples: usize },
}

/// Precondition checks shared by the single-trace and batch entry points
/// (`n_traces` is 1 for the single path). Order is part of the contract:
/// degenerate window pairs must be reported as window errors even when the
/// input is also empty, and emptiness before the length bound.
#[inline]
fn validate_windows(
    sta_len: usize,
    lta_len: usize,
    n_traces: usize,
    trace_len: usize,
) -> Result<(), StaLtaError> {
    if sta_len == 0 || lta_len == 0 {
        return Err(StaLtaError::NonPositiveWindow { sta_len, lta_len });
    }
    if sta_len >= lta_len {
        return Err(StaLtaError::StaNotShorter { sta_len, lta_len });
    }
    if n_traces == 0 || trace_len == 0 {
        return Err(StaLtaError::EmptyInput);
    }
    if lta_len > trace_len {
        return Err(StaLtaError::WindowExceedsTrace { lta_len, trace_len });
    }
    Ok(())
}

/// One linear pass over a trace, writing one ratio per sample into `out`.
///
/// Both running sums accumulate |x[i]|; once an index has moved past a
/// window's length, the sample falling out of that window is subtracted, so
/// each sum always equals the sum over its current (possibly still growing)
/// window. Divisors are the actual window occupancy, not the target length,
/// which keeps the first `lta_len - 1` ratios well-defined without padding.
#[inline(always)]
fn sta_lta_row(data: &[f64], sta_len: usize, lta_len: usize, out: &mut [f64]) {
    debug_assert_eq!(data.len(), out.len());

    let mut sta_sum = 0.0;
    let mut lta_sum = 0.0;

    for i in 0..data.len() {
        let abs_val = data[i].abs();
        sta_sum += abs_val;
        lta_sum += abs_val;

        if i >= sta_len {
            sta_sum -= data[i - sta_len].abs();
        }
        if i >= lta_len {
            lta_sum -= data[i - lta_len].abs();
        }

        let sta_count = (i + 1).min(sta_len) as f64;
        let lta_count = (i + 1).min(lta_len) as f64;

        let sta = sta_sum / sta_count;
        let lta = lta_sum / lta_count;

        // False for NaN baselines as well, so poisoned windows emit 0.0
        // rather than dividing NaN by NaN.
        out[i] = if lta > LTA_FLOOR { sta / lta } else { 0.0 };
    }
}

/// STA/LTA trigger ratio for a single trace.
///
/// Pure function of its input: no state survives the call, and the output
/// vector always has exactly the input's length.
#[inline]
pub fn sta_lta(input: &StaLtaInput) -> Result<StaLtaOutput, StaLtaError> {
    let data: &[f64] = input.as_ref();
    let sta_len = input.get_sta_len();
    let lta_len = input.get_lta_len();

    validate_windows(sta_len, lta_len, 1, data.len())?;

    let mut values = vec![0.0; data.len()];
    sta_lta_row(data, sta_len, lta_len, &mut values);

    Ok(StaLtaOutput { values })
}

#[derive(Debug, Clone)]
pub struct StaLtaBatchOutput {
    /// Row-major `rows x cols` ratio matrix, cacheline-aligned.
    pub values: AVec<f64>,
    pub rows: usize,
    pub cols: usize,
}

impl StaLtaBatchOutput {
    #[inline]
    pub fn row(&self, trace: usize) -> &[f64] {
        &self.values[trace * self.cols..(trace + 1) * self.cols]
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct StaLtaBatchBuilder {
    sta_len: Option<usize>,
    lta_len: Option<usize>,
}

impl StaLtaBatchBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn sta_len(mut self, len: usize) -> Self {
        self.sta_len = Some(len);
        self
    }

    #[inline]
    pub fn lta_len(mut self, len: usize) -> Self {
        self.lta_len = Some(len);
        self
    }

    #[inline]
    pub fn apply(
        self,
        data: &[f64],
        n_traces: usize,
        n_samples: usize,
    ) -> Result<StaLtaBatchOutput, StaLtaError> {
        let params = StaLtaParams {
            sta_len: self.sta_len,
            lta_len: self.lta_len,
        };
        sta_lta_batch(data, n_traces, n_samples, &params)
    }
}

/// STA/LTA trigger ratio for a batch of equally long traces, one row per
/// trace in a flat row-major buffer.
///
/// Validation runs once against the shared sample count before any row is
/// dispatched; a failure aborts with no partial output. Rows are then
/// distributed over the process-wide rayon pool, each worker writing only its
/// own output row. Calling this from many already-parallel call sites shares
/// that pool and can oversubscribe it; results are unaffected.
pub fn sta_lta_batch(
    data: &[f64],
    n_traces: usize,
    n_samples: usize,
    params: &StaLtaParams,
) -> Result<StaLtaBatchOutput, StaLtaError> {
    let total = n_traces
        .checked_mul(n_samples)
        .ok_or(StaLtaError::BatchTooLarge { n_traces, n_samples })?;
    if data.len() != total {
        return Err(StaLtaError::ShapeMismatch {
            len: data.len(),
            n_traces,
            n_samples,
        });
    }

    let sta_len = params.sta_len.unwrap_or(10);
    let lta_len = params.lta_len.unwrap_or(100);

    validate_windows(sta_len, lta_len, n_traces, n_samples)?;

    let mut values = AVec::<f64>::with_capacity(CACHELINE_ALIGN, total);
    values.resize(total, 0.0);

    let do_row = |trace: usize, out_row: &mut [f64]| {
        let row = &data[trace * n_samples..(trace + 1) * n_samples];
        sta_lta_row(row, sta_len, lta_len, out_row);
    };

    values
        .as_mut_slice()
        .par_chunks_mut(n_samples)
        .enumerate()
        .for_each(|(trace, out_row)| do_row(trace, out_row));

    Ok(StaLtaBatchOutput {
        values,
        rows: n_traces,
        cols: n_samples,
    })
}

#[cfg(feature = "python")]
#[pyfunction(name = "compute_sta_lta")]
#[pyo3(signature = (data, *, sta_len, lta_len))]
pub fn sta_lta_py<'py>(
    py: Python<'py>,
    data: numpy::PyReadonlyArray1<'py, f64>,
    sta_len: usize,
    lta_len: usize,
) -> PyResult<Bound<'py, numpy::PyArray1<f64>>> {
    use numpy::PyArray1;

    let slice_in = data.as_slice()?; // zero-copy, read-only view

    // NOTE: PyArray1::new() creates uninitialized memory; every element is
    // written below before the array is handed back to Python.
    let out_arr = unsafe { PyArray1::<f64>::new(py, [slice_in.len()], false) };
    let slice_out = unsafe { out_arr.as_slice_mut()? };

    py.allow_threads(|| -> Result<(), StaLtaError> {
        validate_windows(sta_len, lta_len, 1, slice_in.len())?;
        sta_lta_row(slice_in, sta_len, lta_len, slice_out);
        Ok(())
    })
    .map_err(|e| PyValueError::new_err(e.to_string()))?;

    Ok(out_arr)
}

#[cfg(feature = "python")]
#[pyfunction(name = "compute_sta_lta_batch")]
#[pyo3(signature = (data, *, sta_len, lta_len))]
pub fn sta_lta_batch_py<'py>(
    py: Python<'py>,
    data: numpy::PyReadonlyArray2<'py, f64>,
    sta_len: usize,
    lta_len: usize,
) -> PyResult<Bound<'py, numpy::PyArray2<f64>>> {
    use numpy::PyArray1;

    let shape = data.shape();
    let (rows, cols) = (shape[0], shape[1]);
    let slice_in = data.as_slice()?;

    let out_arr = unsafe { PyArray1::<f64>::new(py, [rows * cols], false) };
    let slice_out = unsafe { out_arr.as_slice_mut()? };

    py.allow_threads(|| -> Result<(), StaLtaError> {
        validate_windows(sta_len, lta_len, rows, cols)?;

        slice_out
            .par_chunks_mut(cols)
            .enumerate()
            .for_each(|(trace, out_row)| {
                let row = &slice_in[trace * cols..(trace + 1) * cols];
                sta_lta_row(row, sta_len, lta_len, out_row);
            });
        Ok(())
    })
    .map_err(|e| PyValueError::new_err(e.to_string()))?;

    Ok(out_arr.reshape((rows, cols))?)
}

//! Presentation-layer rescaling of supplementary vertices.
//!
//! This is **not** a statistical correction. Multiplying every coordinate by the same power of
//! ten only moves supplementary points onto the same visual scale as the primary points; signs
//! and relative ordering are left untouched, and the scaled coordinates must not be compared
//! numerically against the primary ones.

use log::debug;
use ndarray::{s, Array2, ArrayView2};

use crate::error::{McaError, Result};

fn leading_axes(values: ArrayView2<f64>) -> ArrayView2<f64> {
    let n_axes = values.ncols().min(2);
    values.slice_move(s![.., ..n_axes])
}

// NaN wins, unlike `f64::max`.
fn max_abs(values: ArrayView2<f64>) -> Option<f64> {
    values.iter().map(|v| v.abs()).reduce(|a, b| {
        if a.is_nan() || b.is_nan() {
            f64::NAN
        } else {
            a.max(b)
        }
    })
}

// Truncates toward zero, so 0.05 is order -1 and 0.5 is order 0.
fn exponent(max: f64) -> Result<i32> {
    if !max.is_finite() || max <= 0.0 {
        return Err(McaError::DegenerateInput(format!(
            "cannot take the order of magnitude of {}",
            max
        )));
    }
    Ok(max.log10().trunc() as i32)
}

/// Base-10 exponent of the largest absolute value in `values`.
///
/// # Errors
/// - [`McaError::EmptyInput`] if `values` has no entries
/// - [`McaError::DegenerateInput`] if every entry is zero or the maximum is not finite
pub fn order_of_magnitude(values: ArrayView2<f64>) -> Result<i32> {
    let max = max_abs(values)
        .ok_or_else(|| McaError::EmptyInput("no values to take a magnitude of".into()))?;
    exponent(max)
}

/// Order of magnitude of the primary points on a 2D map: the first two axes of the row profiles,
/// together with the first two axes of the column vertices when those are plotted too.
pub fn plot_order_of_magnitude(
    row_profiles: ArrayView2<f64>,
    column_vertices: Option<ArrayView2<f64>>,
) -> Result<i32> {
    let rows = max_abs(leading_axes(row_profiles));
    let cols = column_vertices.and_then(|g| max_abs(leading_axes(g)));
    let max = match (rows, cols) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => {
            return Err(McaError::EmptyInput("no primary points to plot".into()));
        }
    };
    exponent(max)
}

/// Rescales `g_supp` by `10^(target_order - o_supp)`, where `o_supp` is the order of magnitude of
/// its first two axes. Returns an exact copy when the orders already agree or when those axes
/// are all zero.
///
/// # Errors
/// - [`McaError::EmptyInput`] if `g_supp` has no rows or no columns
/// - [`McaError::DegenerateInput`] if any entry of `g_supp`, on any axis, is NaN or infinite
pub fn scale_supplements(g_supp: ArrayView2<f64>, target_order: i32) -> Result<Array2<f64>> {
    if g_supp.nrows() == 0 || g_supp.ncols() == 0 {
        return Err(McaError::EmptyInput(format!(
            "supplement vertex matrix is {}x{}",
            g_supp.nrows(),
            g_supp.ncols()
        )));
    }
    if let Some(((j, k), v)) = g_supp.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(McaError::DegenerateInput(format!(
            "supplement vertex ({}, {}) is {}",
            j, k, v
        )));
    }

    let max = max_abs(leading_axes(g_supp)).unwrap_or(0.0);
    if max == 0.0 {
        debug!("Supplement vertices sit at the origin, nothing to rescale");
        return Ok(g_supp.to_owned());
    }

    let d = target_order - exponent(max)?;
    if d == 0 {
        return Ok(g_supp.to_owned());
    }

    debug!("Rescaling supplement vertices by 10^{}", d);
    let factor = 10f64.powi(d);
    Ok(g_supp.mapv(|v| v * factor))
}

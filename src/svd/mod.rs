//! Thin singular value decomposition over `ndarray` matrices, backed by nalgebra's
//! Golub-Kahan implementation.

use log::debug;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2};
use nshare::{IntoNalgebra, IntoNdarray2};

use crate::error::{McaError, Result};

pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Reduced SVD `x = u · diag(s) · vt` with the singular triplets in descending order.
pub struct SVD {
    u: Array2<f64>,
    s: Array1<f64>,
    vt: Array2<f64>,
}

impl SVD {
    /// Decomposes `x`, giving up after `max_iterations` implicit QR sweeps.
    ///
    /// A `max_iterations` of 0 lifts the cap entirely.
    ///
    /// # Errors
    /// - [`McaError::DegenerateInput`] if `x` has no rows or no columns
    /// - [`McaError::Decomposition`] if the sweeps run out before the bidiagonal converges
    pub fn compute(x: ArrayView2<f64>, max_iterations: usize) -> Result<Self> {
        let (m, n) = x.dim();
        if m == 0 || n == 0 {
            return Err(McaError::DegenerateInput(format!(
                "cannot decompose a {}x{} matrix",
                m, n
            )));
        }

        let matrix: DMatrix<f64> = x.as_standard_layout().into_owned().into_nalgebra();
        let svd = matrix
            .try_svd(true, true, f64::EPSILON, max_iterations)
            .ok_or_else(|| {
                McaError::Decomposition(format!(
                    "SVD of {}x{} matrix did not converge within {} iterations",
                    m, n, max_iterations
                ))
            })?;

        let u = svd
            .u
            .ok_or_else(|| McaError::Decomposition("left singular vectors missing".into()))?
            .into_ndarray2();
        let vt = svd
            .v_t
            .ok_or_else(|| McaError::Decomposition("right singular vectors missing".into()))?
            .into_ndarray2();
        let s = Array1::from(svd.singular_values.as_slice().to_vec());

        let mut order: Vec<usize> = (0..s.len()).collect();
        order.sort_by(|&a, &b| s[b].total_cmp(&s[a]));

        let mut sorted = SVD {
            u: Array2::zeros(u.raw_dim()),
            s: Array1::zeros(s.len()),
            vt: Array2::zeros(vt.raw_dim()),
        };
        for (i, &idx) in order.iter().enumerate() {
            sorted.s[i] = s[idx];
            sorted.u.column_mut(i).assign(&u.column(idx));
            sorted.vt.row_mut(i).assign(&vt.row(idx));
        }

        debug!(
            "SVD of {}x{} matrix: {} singular values, leading {:?}",
            m,
            n,
            sorted.s.len(),
            sorted.s.get(0)
        );

        Ok(sorted)
    }

    /// m×k left singular vectors.
    pub fn u(&self) -> &Array2<f64> {
        &self.u
    }

    pub fn s(&self) -> &Array1<f64> {
        &self.s
    }

    /// k×n right singular vectors, one per row.
    pub fn vt(&self) -> &Array2<f64> {
        &self.vt
    }
}

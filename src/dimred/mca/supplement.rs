//! Post-hoc projection of supplementary indicator columns onto axes computed without them.

use log::{debug, warn};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{McaError, Result};

/// How a supplementary column's observations are aggregated before mapping through the
/// unweighted row profiles `F · diag(s)^-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupplementWeighting {
    /// Barycentre of the column's observations: `g_j = (1/n_j) Σ_i x_ij F_i / s`.
    ///
    /// This is the transition formula, so a supplementary level sits where it would have sat
    /// as a principal column coordinate had it been part of the decomposition.
    #[default]
    Barycentric,
    /// Sum of the column's observations scaled by the column total: `g_j = n_j Σ_i x_ij F_i / s`.
    ///
    /// Inflates coordinates by `n_j²` relative to [`SupplementWeighting::Barycentric`]; only
    /// meaningful after [`scale_supplements`](super::scale_supplements).
    ColumnTotal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SupplementProjector {
    weighting: SupplementWeighting,
}

impl SupplementProjector {
    pub fn new(weighting: SupplementWeighting) -> Self {
        Self { weighting }
    }

    pub fn weighting(&self) -> SupplementWeighting {
        self.weighting
    }

    /// Projects `x_supp` (I×J_supp) onto the axes of `f` (I×K), returning J_supp×K coordinates.
    ///
    /// An all-zero supplementary column has no observations to average and is placed at the
    /// origin.
    ///
    /// # Errors
    /// - [`McaError::DimensionMismatch`] if `x_supp` and `f` disagree on rows, or `s` and `f`
    ///   disagree on axes
    /// - [`McaError::SingularAxis`] if any singular value is zero
    /// - [`McaError::DegenerateInput`] if `x_supp` holds negative or non-finite entries
    pub fn project(
        &self,
        x_supp: ArrayView2<f64>,
        f: ArrayView2<f64>,
        s: ArrayView1<f64>,
    ) -> Result<Array2<f64>> {
        if x_supp.nrows() != f.nrows() {
            return Err(McaError::DimensionMismatch {
                context: "supplement rows vs row profiles",
                expected: f.nrows(),
                got: x_supp.nrows(),
            });
        }
        if s.len() != f.ncols() {
            return Err(McaError::DimensionMismatch {
                context: "singular values vs row profile axes",
                expected: f.ncols(),
                got: s.len(),
            });
        }
        if let Some(axis) = s.iter().position(|&v| v == 0.0) {
            return Err(McaError::SingularAxis { axis });
        }
        if let Some(((i, j), v)) = x_supp
            .indexed_iter()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(McaError::DegenerateInput(format!(
                "supplement entry ({}, {}) is {}, expected a finite non-negative value",
                i, j, v
            )));
        }

        let fd_inv = Array2::from_shape_fn(f.raw_dim(), |(i, k)| f[[i, k]] / s[k]);
        let mut g_supp = Array2::zeros((x_supp.ncols(), f.ncols()));

        for (j, (column, mut out)) in x_supp
            .axis_iter(Axis(1))
            .zip(g_supp.axis_iter_mut(Axis(0)))
            .enumerate()
        {
            let n_j = column.sum();
            let factor = match self.weighting {
                SupplementWeighting::Barycentric if n_j > 0.0 => n_j.recip(),
                SupplementWeighting::Barycentric => {
                    warn!("Supplementary column {} has no observations, placing it at the origin", j);
                    0.0
                }
                SupplementWeighting::ColumnTotal => n_j,
            };
            out.assign(&(column.dot(&fd_inv) * factor));
        }

        debug!(
            "Projected {} supplementary columns onto {} axes ({:?})",
            g_supp.nrows(),
            g_supp.ncols(),
            self.weighting
        );

        Ok(g_supp)
    }
}

/// Projects with [`SupplementWeighting::Barycentric`].
pub fn project_supplements(
    x_supp: ArrayView2<f64>,
    f: ArrayView2<f64>,
    s: ArrayView1<f64>,
) -> Result<Array2<f64>> {
    SupplementProjector::default().project(x_supp, f, s)
}

//! # Multiple Correspondence Analysis
//!
//! Decomposes a (one-hot) indicator matrix into principal row coordinates, standard column
//! coordinates and singular values. The row profiles `F` carry the singular value weighting,
//! the column vertices `G` do not; that asymmetry is the principal-row / standard-column
//! convention and downstream projection relies on it.
//!
//! ```text
//! Z = X / N,  r = Z·1,  c = Zᵗ·1
//! S = Dr^-1/2 (Z - r cᵗ) Dc^-1/2 = U diag(s) Vᵗ
//! F = Dr^-1/2 U diag(s),   G = Dc^-1/2 V
//! ```

use log::{debug, warn};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{McaError, Result};
use crate::svd::{SVD, DEFAULT_MAX_ITERATIONS};

pub mod layout;
pub mod scaling;
pub mod supplement;

pub use layout::{LabeledVertices, MapLayout, MapLayoutBuilder, PointColoring};
pub use scaling::{order_of_magnitude, plot_order_of_magnitude, scale_supplements};
pub use supplement::{project_supplements, SupplementProjector, SupplementWeighting};

pub struct McaBuilder {
    n_components: Option<usize>,
    null_axis_tolerance: Option<f64>,
    max_iterations: usize,
}

impl McaBuilder {
    pub fn new() -> Self {
        McaBuilder {
            n_components: None,
            null_axis_tolerance: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Keep at most this many axes (at least one is always kept).
    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = Some(n_components);
        self
    }

    /// Drop trailing axes whose singular value is at or below `tolerance`.
    ///
    /// An indicator matrix over `Q` variables and `J` levels has at most `J - Q` axes with
    /// non-zero inertia; the remaining singular values are numerical noise and blow up when
    /// unweighted during supplementary projection. Without an explicit tolerance the engine
    /// uses `s_max · max(I, J) · ε`, so only the numerical rank is kept.
    pub fn null_axis_tolerance(mut self, tolerance: f64) -> Self {
        self.null_axis_tolerance = Some(tolerance);
        self
    }

    /// Cap on implicit QR sweeps in the SVD; running out is [`McaError::Decomposition`].
    /// 0 lifts the cap.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn build(self) -> Mca {
        Mca {
            n_components: self.n_components,
            null_axis_tolerance: self.null_axis_tolerance,
            max_iterations: self.max_iterations,
        }
    }
}

impl Default for McaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configured MCA engine. Holds no state between calls.
pub struct Mca {
    n_components: Option<usize>,
    null_axis_tolerance: Option<f64>,
    max_iterations: usize,
}

impl Mca {
    /// Decomposes `x` (observations × levels).
    ///
    /// # Errors
    /// - [`McaError::DegenerateInput`] if `x` is empty, has fewer than two rows or columns,
    ///   contains negative or non-finite entries, sums to zero, or has a zero row/column marginal
    /// - [`McaError::Decomposition`] if the SVD does not converge
    pub fn fit(&self, x: ArrayView2<f64>) -> Result<McaResult> {
        let (n_rows, n_cols) = x.dim();
        if n_rows == 0 || n_cols == 0 {
            return Err(McaError::DegenerateInput(format!(
                "indicator matrix is empty ({}x{})",
                n_rows, n_cols
            )));
        }
        if let Some(((i, j), v)) = x.indexed_iter().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            return Err(McaError::DegenerateInput(format!(
                "entry ({}, {}) is {}, expected a finite non-negative value",
                i, j, v
            )));
        }

        let total = x.sum();
        if total <= 0.0 {
            return Err(McaError::DegenerateInput(
                "indicator matrix has zero grand total".into(),
            ));
        }

        let z = x.mapv(|v| v / total);
        let row_masses = z.sum_axis(Axis(1));
        let column_masses = z.sum_axis(Axis(0));
        check_masses(row_masses.view(), "row")?;
        check_masses(column_masses.view(), "column")?;

        let max_rank = n_rows.min(n_cols);
        if max_rank < 2 {
            return Err(McaError::DegenerateInput(format!(
                "a {}x{} matrix has no non-trivial principal axis",
                n_rows, n_cols
            )));
        }

        let row_isqrt = row_masses.mapv(|m| m.sqrt().recip());
        let col_isqrt = column_masses.mapv(|m| m.sqrt().recip());

        let residuals = Array2::from_shape_fn((n_rows, n_cols), |(i, j)| {
            (z[[i, j]] - row_masses[i] * column_masses[j]) * row_isqrt[i] * col_isqrt[j]
        });

        let svd = SVD::compute(residuals.view(), self.max_iterations)?;
        let (u, sv, vt) = (svd.u(), svd.s(), svd.vt());

        let total_inertia = sv.mapv(|v| v * v).sum();
        let n_components = self.retained_axes(sv.view(), max_rank, n_rows.max(n_cols));

        let singular_values = sv.slice(s![..n_components]).to_owned();
        let row_profiles = Array2::from_shape_fn((n_rows, n_components), |(i, k)| {
            row_isqrt[i] * u[[i, k]] * singular_values[k]
        });
        let column_vertices =
            Array2::from_shape_fn((n_cols, n_components), |(j, k)| col_isqrt[j] * vt[[k, j]]);

        debug!(
            "MCA on {}x{} indicator matrix: N = {}, kept {} of {} axes, total inertia {:.6}",
            n_rows, n_cols, total, n_components, max_rank, total_inertia
        );

        Ok(McaResult {
            row_profiles,
            column_vertices,
            singular_values,
            row_masses,
            column_masses,
            total_inertia,
        })
    }

    fn retained_axes(&self, sv: ArrayView1<f64>, max_rank: usize, max_dim: usize) -> usize {
        // The centred matrix loses one rank to the trivial axis.
        let mut n_components = (max_rank - 1).min(sv.len());
        if let Some(k) = self.n_components {
            n_components = n_components.min(k.max(1));
        }

        let tolerance = self.null_axis_tolerance.unwrap_or_else(|| {
            sv.get(0).copied().unwrap_or(0.0) * max_dim as f64 * f64::EPSILON
        });
        let before = n_components;
        while n_components > 1 && sv[n_components - 1] <= tolerance {
            n_components -= 1;
        }
        if n_components < before {
            debug!(
                "Pruned {} null axes with singular value <= {:e}",
                before - n_components,
                tolerance
            );
        }
        if sv[n_components - 1] <= tolerance {
            warn!("Leading axis carries no inertia (s <= {:e})", tolerance);
        }
        n_components
    }
}

impl Default for Mca {
    fn default() -> Self {
        McaBuilder::new().build()
    }
}

fn check_masses(masses: ArrayView1<f64>, kind: &str) -> Result<()> {
    match masses.iter().position(|&m| m <= 0.0) {
        Some(idx) => Err(McaError::DegenerateInput(format!(
            "{} {} has zero mass",
            kind, idx
        ))),
        None => Ok(()),
    }
}

/// Runs MCA with default settings.
pub fn mca(x: ArrayView2<f64>) -> Result<McaResult> {
    Mca::default().fit(x)
}

/// Output of [`Mca::fit`].
#[derive(Debug, Clone, PartialEq)]
pub struct McaResult {
    row_profiles: Array2<f64>,
    column_vertices: Array2<f64>,
    singular_values: Array1<f64>,
    row_masses: Array1<f64>,
    column_masses: Array1<f64>,
    total_inertia: f64,
}

impl McaResult {
    /// `F`, I×K principal row coordinates.
    pub fn row_profiles(&self) -> &Array2<f64> {
        &self.row_profiles
    }

    /// `G`, J×K standard column coordinates.
    pub fn column_vertices(&self) -> &Array2<f64> {
        &self.column_vertices
    }

    /// `s`, non-increasing.
    pub fn singular_values(&self) -> &Array1<f64> {
        &self.singular_values
    }

    pub fn row_masses(&self) -> &Array1<f64> {
        &self.row_masses
    }

    pub fn column_masses(&self) -> &Array1<f64> {
        &self.column_masses
    }

    pub fn n_components(&self) -> usize {
        self.singular_values.len()
    }

    /// Inertia carried by each retained axis (`s²`).
    pub fn principal_inertias(&self) -> Array1<f64> {
        self.singular_values.mapv(|v| v * v)
    }

    /// Total inertia of the standardized residuals, including axes that were not retained.
    pub fn total_inertia(&self) -> f64 {
        self.total_inertia
    }

    pub fn explained_inertia_ratio(&self) -> Array1<f64> {
        let total = self.total_inertia;
        self.principal_inertias()
            .mapv(|v| if total > 0.0 { v / total } else { 0.0 })
    }

    /// Reassembles the standardized residual matrix `S = Dr^1/2 F Gᵗ Dc^1/2` from the retained
    /// axes. Per-axis sign flips of the singular vectors cancel in this product.
    pub fn reconstruct_residuals(&self) -> Array2<f64> {
        let mut s = self.row_profiles.dot(&self.column_vertices.t());
        for ((i, j), v) in s.indexed_iter_mut() {
            *v *= self.row_masses[i].sqrt() * self.column_masses[j].sqrt();
        }
        s
    }

    /// Projects supplementary indicator columns onto the retained axes.
    pub fn project_supplements(
        &self,
        x_supp: ArrayView2<f64>,
        weighting: SupplementWeighting,
    ) -> Result<Array2<f64>> {
        SupplementProjector::new(weighting).project(
            x_supp,
            self.row_profiles.view(),
            self.singular_values.view(),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;
    use rand::distr::{Distribution, Uniform};
    use rand::{rngs::StdRng, SeedableRng};

    /// 6 observations over A ∈ {a, b, c} and B ∈ {x, y}.
    pub(crate) fn two_variable_indicator() -> Array2<f64> {
        array![
            [1.0, 0.0, 0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0, 0.0, 1.0],
        ]
    }

    fn standardized_residuals(x: &Array2<f64>) -> Array2<f64> {
        let z = x / x.sum();
        let r = z.sum_axis(Axis(1));
        let c = z.sum_axis(Axis(0));
        Array2::from_shape_fn(z.raw_dim(), |(i, j)| {
            (z[[i, j]] - r[i] * c[j]) / (r[i] * c[j]).sqrt()
        })
    }

    #[test]
    fn test_single_variable_counts_2_1_1() {
        let x = array![
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0]
        ];
        let result = mca(x.view()).unwrap();

        assert_abs_diff_eq!(x.sum(), 4.0);
        for &m in result.row_masses() {
            assert_abs_diff_eq!(m, 0.25, epsilon = 1e-12);
        }
        let c = result.column_masses();
        assert_abs_diff_eq!(c[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(c[1], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(c[2], 0.25, epsilon = 1e-12);

        let s = result.singular_values();
        assert!(s.len() <= 2);
        // A lone variable is perfectly associated with itself on every axis.
        for &v in s {
            assert_abs_diff_eq!(v, 1.0, epsilon = 1e-9);
        }
        assert_eq!(result.row_profiles().shape(), &[4, s.len()]);
        assert_eq!(result.column_vertices().shape(), &[3, s.len()]);
    }

    #[test]
    fn test_masses_sum_to_one() -> anyhow::Result<()> {
        let result = mca(two_variable_indicator().view())?;
        assert_relative_eq!(result.row_masses().sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.column_masses().sum(), 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_singular_values_non_increasing() {
        let result = mca(two_variable_indicator().view()).unwrap();
        let s = result.singular_values();
        // Rank J - Q = 5 - 2; the fourth, null axis is pruned.
        assert_eq!(s.len(), 3);
        for w in s.windows(2) {
            assert!(w[0] >= w[1], "singular values out of order: {:?}", s);
        }
    }

    #[test]
    fn test_reconstructs_standardized_residuals() {
        let x = two_variable_indicator();
        let result = mca(x.view()).unwrap();
        let expected = standardized_residuals(&x);
        let reconstructed = result.reconstruct_residuals();
        for ((i, j), v) in expected.indexed_iter() {
            assert_abs_diff_eq!(reconstructed[[i, j]], *v, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let x = two_variable_indicator();
        let first = mca(x.view()).unwrap();
        let second = mca(x.view()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_principal_rows_standard_columns() {
        let result = McaBuilder::new()
            .null_axis_tolerance(1e-9)
            .build()
            .fit(two_variable_indicator().view())
            .unwrap();
        let f = result.row_profiles();
        let g = result.column_vertices();
        let r = result.row_masses();
        let c = result.column_masses();

        for k in 0..result.n_components() {
            let row_inertia: f64 = (0..f.nrows()).map(|i| r[i] * f[[i, k]].powi(2)).sum();
            let col_weight: f64 = (0..g.nrows()).map(|j| c[j] * g[[j, k]].powi(2)).sum();
            assert_relative_eq!(row_inertia, result.singular_values()[k].powi(2), epsilon = 1e-9);
            assert_relative_eq!(col_weight, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_inertia_ratio() {
        let result = McaBuilder::new()
            .null_axis_tolerance(1e-9)
            .build()
            .fit(two_variable_indicator().view())
            .unwrap();
        assert_eq!(result.n_components(), 3);
        assert_relative_eq!(result.explained_inertia_ratio().sum(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(
            result.principal_inertias().sum(),
            result.total_inertia(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_n_components_caps_axes() {
        let result = McaBuilder::new()
            .n_components(2)
            .build()
            .fit(two_variable_indicator().view())
            .unwrap();
        assert_eq!(result.singular_values().len(), 2);
        assert_eq!(result.row_profiles().ncols(), 2);
        assert_eq!(result.column_vertices().ncols(), 2);
    }

    #[test]
    fn test_default_keeps_numerical_rank() {
        let x = two_variable_indicator();
        let default = mca(x.view()).unwrap();
        let explicit = McaBuilder::new()
            .null_axis_tolerance(1e-9)
            .build()
            .fit(x.view())
            .unwrap();
        assert_eq!(default.n_components(), explicit.n_components());
        assert!(default.singular_values().iter().all(|&v| v > 1e-9));

        let all_axes = McaBuilder::new()
            .null_axis_tolerance(-1.0)
            .build()
            .fit(x.view())
            .unwrap();
        assert_eq!(all_axes.n_components(), 4);
    }

    /// 50 observations over five three-level variables, every level present.
    fn seeded_survey() -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(7);
        let level_dist = Uniform::try_from(0..3usize).unwrap();
        let mut x = Array2::zeros((50, 15));
        for i in 0..50 {
            for v in 0..5 {
                let level = if i < 3 { i } else { level_dist.sample(&mut rng) };
                x[[i, v * 3 + level]] = 1.0;
            }
        }
        x
    }

    #[test]
    fn test_iteration_cap_is_decomposition_failure() {
        let x = seeded_survey();
        let capped = McaBuilder::new().max_iterations(1).build().fit(x.view());
        assert!(matches!(capped, Err(McaError::Decomposition(_))));

        let uncapped = McaBuilder::new().max_iterations(0).build().fit(x.view()).unwrap();
        assert!(uncapped.n_components() <= 10);
        assert!(uncapped.singular_values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_degenerate_inputs() {
        let empty = Array2::<f64>::zeros((0, 0));
        assert!(matches!(mca(empty.view()), Err(McaError::DegenerateInput(_))));

        let zeros = Array2::<f64>::zeros((3, 3));
        assert!(matches!(mca(zeros.view()), Err(McaError::DegenerateInput(_))));

        let zero_column = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]];
        assert!(matches!(
            mca(zero_column.view()),
            Err(McaError::DegenerateInput(_))
        ));

        let zero_row = array![[1.0, 0.0], [0.0, 0.0], [0.0, 1.0]];
        assert!(matches!(mca(zero_row.view()), Err(McaError::DegenerateInput(_))));

        let negative = array![[1.0, -1.0], [0.0, 1.0]];
        assert!(matches!(mca(negative.view()), Err(McaError::DegenerateInput(_))));

        let single_column = array![[1.0], [1.0]];
        assert!(matches!(
            mca(single_column.view()),
            Err(McaError::DegenerateInput(_))
        ));
    }
}

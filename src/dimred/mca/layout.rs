//! Plot-ready 2D map of an MCA result.
//!
//! Collects everything a renderer needs for the principal plane: row points with their colouring,
//! annotated column vertices, and supplementary vertices projected and rescaled to the primary
//! points' order of magnitude. Rendering itself (and where the image goes) is up to the caller.

use ndarray::{Array2, ArrayView2};

use super::scaling::{plot_order_of_magnitude, scale_supplements};
use super::supplement::{SupplementProjector, SupplementWeighting};
use super::McaResult;
use crate::error::{McaError, Result};
use crate::indicator::LabelMap;

/// Colouring of the row points.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PointColoring {
    #[default]
    Uniform,
    /// One value per observation, mapped through the renderer's colour scale.
    Values(Vec<f64>),
}

/// Vertices on the principal plane with optional annotations (empty when unlabelled).
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledVertices {
    pub coordinates: Array2<f64>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLayout {
    row_points: Array2<f64>,
    coloring: PointColoring,
    column_vertices: Option<LabeledVertices>,
    supplement_vertices: Option<LabeledVertices>,
    order_of_magnitude: i32,
}

impl MapLayout {
    pub fn builder(result: &McaResult) -> MapLayoutBuilder<'_> {
        MapLayoutBuilder {
            result,
            column_vertices: None,
            supplements: None,
            coloring: PointColoring::Uniform,
        }
    }

    /// I×2 row profile coordinates on the first two axes.
    pub fn row_points(&self) -> &Array2<f64> {
        &self.row_points
    }

    pub fn coloring(&self) -> &PointColoring {
        &self.coloring
    }

    pub fn column_vertices(&self) -> Option<&LabeledVertices> {
        self.column_vertices.as_ref()
    }

    pub fn supplement_vertices(&self) -> Option<&LabeledVertices> {
        self.supplement_vertices.as_ref()
    }

    /// Order of magnitude the supplementary vertices were scaled to.
    pub fn order_of_magnitude(&self) -> i32 {
        self.order_of_magnitude
    }
}

pub struct MapLayoutBuilder<'a> {
    result: &'a McaResult,
    column_vertices: Option<Option<&'a LabelMap>>,
    supplements: Option<(ArrayView2<'a, f64>, Option<&'a LabelMap>, SupplementWeighting)>,
    coloring: PointColoring,
}

impl<'a> MapLayoutBuilder<'a> {
    /// Plots the column vertices, annotated when `labels` is given.
    pub fn with_column_vertices(mut self, labels: Option<&'a LabelMap>) -> Self {
        self.column_vertices = Some(labels);
        self
    }

    /// Projects and plots supplementary indicator columns.
    pub fn with_supplements(
        mut self,
        x_supp: ArrayView2<'a, f64>,
        labels: Option<&'a LabelMap>,
        weighting: SupplementWeighting,
    ) -> Self {
        self.supplements = Some((x_supp, labels, weighting));
        self
    }

    pub fn coloring(mut self, coloring: PointColoring) -> Self {
        self.coloring = coloring;
        self
    }

    /// # Errors
    /// - [`McaError::DimensionMismatch`] if the colouring or any annotation list does not match
    ///   its points, or the supplements do not match the observations
    /// - any error of the supplementary projection or scaling
    pub fn assemble(self) -> Result<MapLayout> {
        let f = self.result.row_profiles();
        let g = self.result.column_vertices();

        if let PointColoring::Values(values) = &self.coloring {
            if values.len() != f.nrows() {
                return Err(McaError::DimensionMismatch {
                    context: "point colours vs observations",
                    expected: f.nrows(),
                    got: values.len(),
                });
            }
        }

        let column_vertices = match self.column_vertices {
            Some(labels) => Some(labeled(g.view(), labels, "column annotations vs vertices")?),
            None => None,
        };

        let order_of_magnitude = plot_order_of_magnitude(
            f.view(),
            column_vertices.as_ref().map(|_| g.view()),
        )?;

        let supplement_vertices = match self.supplements {
            Some((x_supp, labels, weighting)) => {
                let g_supp = SupplementProjector::new(weighting).project(
                    x_supp,
                    f.view(),
                    self.result.singular_values().view(),
                )?;
                let scaled = scale_supplements(g_supp.view(), order_of_magnitude)?;
                Some(labeled(
                    scaled.view(),
                    labels,
                    "supplement annotations vs vertices",
                )?)
            }
            None => None,
        };

        Ok(MapLayout {
            row_points: principal_plane(f.view()),
            coloring: self.coloring,
            column_vertices,
            supplement_vertices,
            order_of_magnitude,
        })
    }
}

// Pads with a zero second axis when only one axis was retained.
fn principal_plane(coordinates: ArrayView2<f64>) -> Array2<f64> {
    let n_axes = coordinates.ncols();
    Array2::from_shape_fn((coordinates.nrows(), 2), |(i, k)| {
        if k < n_axes {
            coordinates[[i, k]]
        } else {
            0.0
        }
    })
}

fn labeled(
    coordinates: ArrayView2<f64>,
    labels: Option<&LabelMap>,
    context: &'static str,
) -> Result<LabeledVertices> {
    let labels = labels.map(LabelMap::annotations).unwrap_or_default();
    if !labels.is_empty() && labels.len() != coordinates.nrows() {
        return Err(McaError::DimensionMismatch {
            context,
            expected: coordinates.nrows(),
            got: labels.len(),
        });
    }
    Ok(LabeledVertices {
        coordinates: principal_plane(coordinates),
        labels,
    })
}

//! # Indicator Matrices
//!
//! One-hot encoding of categorical observations. Each variable contributes a block of columns,
//! one per level, with levels in sorted order and variables in insertion order.

use std::collections::{BTreeSet, HashSet};
use std::ops::Range;

use log::debug;
use ndarray::{Array2, ArrayView2};

use crate::error::{McaError, Result};

mod binning;

pub use binning::CountBins;

/// Ordered mapping from variable name to its ordered levels. Used to annotate vertices and to
/// locate each variable's column block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelMap {
    entries: Vec<(String, Vec<String>)>,
}

impl LabelMap {
    /// Builds a label map, rejecting duplicate variable names.
    pub fn from_entries<I, S, L>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<L>)>,
        S: Into<String>,
        L: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        for (name, levels) in entries {
            let name = name.into();
            if !seen.insert(name.clone()) {
                return Err(McaError::InvalidTable(format!(
                    "variable '{}' appears more than once",
                    name
                )));
            }
            collected.push((name, levels.into_iter().map(Into::into).collect()));
        }
        Ok(Self { entries: collected })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn levels(&self, variable: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, levels)| levels.as_slice())
    }

    /// Total number of levels, i.e. indicator columns.
    pub fn n_levels(&self) -> usize {
        self.entries.iter().map(|(_, levels)| levels.len()).sum()
    }

    /// Column range occupied by each variable, in order.
    pub fn blocks(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.entries
            .iter()
            .map(|(_, levels)| {
                let block = start..start + levels.len();
                start = block.end;
                block
            })
            .collect()
    }

    /// `"{variable}_{level}"` for every column, in column order.
    pub fn annotations(&self) -> Vec<String> {
        let mut notes = Vec::with_capacity(self.n_levels());
        for (name, levels) in &self.entries {
            notes.extend(levels.iter().map(|level| format!("{}_{}", name, level)));
        }
        notes
    }
}

/// Indicator matrix together with the labels of its column blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorMatrix {
    values: Array2<f64>,
    labels: LabelMap,
}

impl IndicatorMatrix {
    /// Wraps an externally built matrix, checking it against `labels`.
    pub fn new(values: Array2<f64>, labels: LabelMap) -> Result<Self> {
        let matrix = Self { values, labels };
        matrix.validate()?;
        Ok(matrix)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn into_parts(self) -> (Array2<f64>, LabelMap) {
        (self.values, self.labels)
    }

    /// Checks that every entry is 0 or 1 and that each row picks exactly one level per variable.
    pub fn validate(&self) -> Result<()> {
        if self.values.ncols() != self.labels.n_levels() {
            return Err(McaError::DimensionMismatch {
                context: "indicator columns vs labelled levels",
                expected: self.labels.n_levels(),
                got: self.values.ncols(),
            });
        }
        if let Some(((i, j), v)) = self
            .values
            .indexed_iter()
            .find(|(_, v)| **v != 0.0 && **v != 1.0)
        {
            return Err(McaError::InvalidTable(format!(
                "entry ({}, {}) is {}, expected 0 or 1",
                i, j, v
            )));
        }

        let variables: Vec<&str> = self.labels.variables().collect();
        for (block, name) in self.labels.blocks().into_iter().zip(variables) {
            for (i, row) in self.values.rows().into_iter().enumerate() {
                let picked: f64 = row.iter().skip(block.start).take(block.len()).sum();
                if picked != 1.0 {
                    return Err(McaError::InvalidTable(format!(
                        "row {} selects {} levels of '{}', expected exactly one",
                        i, picked, name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Builds an [`IndicatorMatrix`] from categorical columns.
///
/// ```
/// use single_mca::IndicatorMatrixBuilder;
///
/// let x = IndicatorMatrixBuilder::new()
///     .variable("blush", ["Y", "N", "N"])
///     .variable("keyword", ["glam", "beginner", "glam"])
///     .build()
///     .unwrap();
/// assert_eq!(x.labels().annotations(), ["blush_N", "blush_Y", "keyword_beginner", "keyword_glam"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IndicatorMatrixBuilder {
    variables: Vec<(String, Vec<String>)>,
}

impl IndicatorMatrixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one categorical variable; `values` holds one level per observation.
    pub fn variable<S, I, V>(mut self, name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.variables.push((
            name.into(),
            values.into_iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    /// # Errors
    /// [`McaError::InvalidTable`] if there are no variables or observations, a variable name is
    /// repeated, or the variables disagree on the number of observations.
    pub fn build(self) -> Result<IndicatorMatrix> {
        let n_rows = match self.variables.first() {
            Some((_, values)) => values.len(),
            None => return Err(McaError::InvalidTable("no variables given".into())),
        };
        if n_rows == 0 {
            return Err(McaError::InvalidTable("no observations given".into()));
        }
        if let Some((name, values)) = self.variables.iter().find(|(_, v)| v.len() != n_rows) {
            return Err(McaError::InvalidTable(format!(
                "variable '{}' has {} observations, expected {}",
                name,
                values.len(),
                n_rows
            )));
        }

        let labels = LabelMap::from_entries(self.variables.iter().map(|(name, values)| {
            let levels: BTreeSet<&str> = values.iter().map(String::as_str).collect();
            (name.clone(), levels.into_iter().collect::<Vec<&str>>())
        }))?;

        let mut matrix = Array2::zeros((n_rows, labels.n_levels()));
        let blocks = labels.blocks();
        for (((_, values), (_, levels)), block) in
            self.variables.iter().zip(&labels.entries).zip(blocks)
        {
            for (i, value) in values.iter().enumerate() {
                // Levels are sorted, and every value is one of them.
                if let Ok(offset) = levels.binary_search(value) {
                    matrix[[i, block.start + offset]] = 1.0;
                }
            }
        }

        debug!(
            "Built {}x{} indicator matrix over {} variables",
            n_rows,
            labels.n_levels(),
            labels.len()
        );

        Ok(IndicatorMatrix {
            values: matrix,
            labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn products() -> IndicatorMatrix {
        IndicatorMatrixBuilder::new()
            .variable("mascara", ["Y", "N", "Y", "Y"])
            .variable("keyword", ["glam", "natural", "beginner", "glam"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_levels_sorted_variables_in_order() {
        let x = products();
        let labels = x.labels();
        assert_eq!(labels.variables().collect::<Vec<_>>(), ["mascara", "keyword"]);
        assert_eq!(labels.levels("mascara").unwrap(), ["N", "Y"]);
        assert_eq!(labels.levels("keyword").unwrap(), ["beginner", "glam", "natural"]);
        assert_eq!(labels.blocks(), vec![0..2, 2..5]);
        assert_eq!(
            labels.annotations(),
            [
                "mascara_N",
                "mascara_Y",
                "keyword_beginner",
                "keyword_glam",
                "keyword_natural"
            ]
        );
    }

    #[test]
    fn test_one_hot_values() -> anyhow::Result<()> {
        let x = products();
        assert_eq!(
            x.values(),
            &array![
                [0.0, 1.0, 0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0, 0.0, 1.0],
                [0.0, 1.0, 1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 1.0, 0.0],
            ]
        );
        x.validate()?;
        Ok(())
    }

    #[test]
    fn test_builder_errors() {
        assert!(matches!(
            IndicatorMatrixBuilder::new().build(),
            Err(McaError::InvalidTable(_))
        ));
        assert!(matches!(
            IndicatorMatrixBuilder::new()
                .variable("a", ["x", "y"])
                .variable("b", ["x"])
                .build(),
            Err(McaError::InvalidTable(_))
        ));
        assert!(matches!(
            IndicatorMatrixBuilder::new()
                .variable("a", ["x", "y"])
                .variable("a", ["x", "x"])
                .build(),
            Err(McaError::InvalidTable(_))
        ));
        assert!(matches!(
            IndicatorMatrixBuilder::new()
                .variable("a", Vec::<String>::new())
                .build(),
            Err(McaError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_validate_rejects_broken_blocks() {
        let labels = LabelMap::from_entries([("a", vec!["x", "y"])]).unwrap();

        let two_levels = array![[1.0, 1.0], [0.0, 1.0]];
        assert!(matches!(
            IndicatorMatrix::new(two_levels, labels.clone()),
            Err(McaError::InvalidTable(_))
        ));

        let fractional = array![[0.5, 0.5], [0.0, 1.0]];
        assert!(matches!(
            IndicatorMatrix::new(fractional, labels.clone()),
            Err(McaError::InvalidTable(_))
        ));

        let too_wide = array![[1.0, 0.0, 0.0]];
        assert!(matches!(
            IndicatorMatrix::new(too_wide, labels),
            Err(McaError::DimensionMismatch { expected: 2, got: 3, .. })
        ));
    }
}

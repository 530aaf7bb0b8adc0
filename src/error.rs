//! Error taxonomy for the correspondence analysis pipeline.
//!
//! Every failure is a local computation failure surfaced straight to the caller. None of them
//! is recoverable inside the crate; the caller fixes the input and reruns the whole computation.

/// Errors raised while building indicator matrices, decomposing them, or projecting onto the
/// resulting axes.
#[derive(Debug, thiserror::Error)]
pub enum McaError {
    /// The input carries no usable mass: it is empty, sums to zero, has a zero row or column
    /// marginal, or contains negative/non-finite entries.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Two matrices that must agree on a dimension do not.
    #[error("Dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Which check failed
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// A singular value is zero, so the axis cannot be unweighted.
    #[error("Singular value of axis {axis} is zero, cannot invert diag(s)")]
    SingularAxis { axis: usize },

    /// Nothing to scale.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// The singular value decomposition did not converge.
    #[error("Decomposition failed: {0}")]
    Decomposition(String),

    /// The categorical table handed to the indicator builder is malformed.
    #[error("Invalid categorical table: {0}")]
    InvalidTable(String),
}

pub type Result<T> = std::result::Result<T, McaError>;

pub mod dimred;
pub mod error;
pub mod indicator;
pub mod svd;

pub use dimred::mca::{mca, Mca, McaBuilder, McaResult};
pub use error::{McaError, Result};
pub use indicator::{CountBins, IndicatorMatrix, IndicatorMatrixBuilder, LabelMap};

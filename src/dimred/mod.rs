//! # Dimensionality Reduction
//!
//! Algorithms for mapping high-dimensional categorical data onto a few principal axes while
//! preserving the associations between categories. The result is meant for 2D maps of how
//! observations and category levels relate.
//!
//! ## Currently Available
//! - **MCA** ([`mca`]): Multiple Correspondence Analysis of indicator matrices, with post-hoc
//!   projection of supplementary variables and plot-scale normalization
//!
//! ## Algorithm Selection Guide
//! - Use **MCA** when every variable is categorical and each observation picks exactly one level
//!   per variable
//! - Use supplementary projection for variables that should be *placed* on the map without
//!   shaping its axes

pub mod mca;

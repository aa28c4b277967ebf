//! # EpiFig Charts
//!
//! Plotly-compatible chart specifications for the COVID-19 dashboard and the
//! pipeline that builds all five of them from a feature service.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod assembler;
pub mod chart;
pub mod pipeline;

pub use assembler::ChartAssembler;
pub use chart::*;
pub use pipeline::FigurePipeline;

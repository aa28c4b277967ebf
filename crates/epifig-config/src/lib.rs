//! # EpiFig Config
//!
//! Type-safe configuration for EpiFig: feature-service endpoints, HTTP client
//! limits, chart settings and logging, loaded from YAML with environment
//! variable overrides.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use defaults::BLUES;
pub use loader::*;
pub use schema::*;
pub use validator::*;

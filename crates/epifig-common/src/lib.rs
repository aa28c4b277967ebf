//! # EpiFig Common
//!
//! Shared types, error handling and logging for EpiFig.
//!
//! This crate provides the foundational types used across all other crates
//! in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{EpiFigError, Result};
pub use logging::{init_default_logging, init_logging, LoggingConfig};
pub use types::*;

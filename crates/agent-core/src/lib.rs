//! Core abstractions shared across the workspace
//!
//! Tools, data-access operations and the CLI all report failures to the
//! agent layer through the [`Error`] type defined here.

pub mod error;

pub use error::{Error, Result};

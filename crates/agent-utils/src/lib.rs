//! Shared utilities
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and environment-variable handling.

pub mod env;
pub mod logging;

pub use env::{
    EnvError, EnvRequirement, EnvStatus, check_environment, optional_env, parse_env, required_env,
};
pub use logging::{LogFormat, init_tracing, init_tracing_with};

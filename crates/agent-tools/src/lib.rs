//! Tool management and execution framework
//!
//! This crate provides a framework for defining and executing tools (functions)
//! that agents can call to fetch data on their behalf.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolDefinition};

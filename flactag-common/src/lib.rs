//! # flactag common library
//!
//! Shared code for the flactag crates:
//! - Error types
//! - TOML configuration loading
//! - Log sink construction (file + console)
//! - External command-line tool invocation

pub mod config;
pub mod error;
pub mod logging;
pub mod process;

pub use error::{Error, Result};
pub use process::{ProcessRunner, ToolCommand, ToolOutput, ToolRunner};

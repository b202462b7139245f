//! Command line interface for pymicrodose_release.
//!
//! This module provides argument parsing, command execution and
//! colored user feedback.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, RuntimeConfig, project_root};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}

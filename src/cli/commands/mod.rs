//! Command execution functions.
//!
//! Each subcommand lives in its own module; this one validates arguments,
//! dispatches, and turns errors into exit codes with recovery suggestions.

mod clean;
mod helpers;
mod metadata;
mod status;
mod upload;
mod version;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use clean::execute_clean;
use metadata::execute_metadata;
use status::execute_status;
use upload::execute_upload;
use version::execute_version;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        // Create output for validation errors (never quiet)
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(2);
    }

    let config = RuntimeConfig::from(&args);
    log::debug!(
        "Running '{}' with manifest {}",
        args.command.name(),
        config.config_path.display()
    );

    let result = match &args.command {
        Command::Upload { dry_run, no_push } => {
            execute_upload(&config, *dry_run, *no_push).await
        }
        Command::Clean => execute_clean(&config),
        Command::Version { tag } => execute_version(&config, *tag),
        Command::Metadata { json } => execute_metadata(&config, *json),
        Command::Status {
            json,
            detailed,
            clear,
        } => execute_status(&config, *json, *detailed, *clear),
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\nRecovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}

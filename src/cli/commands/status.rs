//! Status command implementation.
//!
//! Displays the outcome of the last recorded release.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::state::{create_state_manager, has_recorded_release};

/// Execute status command
pub(super) fn execute_status(
    config: &RuntimeConfig,
    json: bool,
    detailed: bool,
    clear: bool,
) -> Result<()> {
    let state_manager = create_state_manager(&config.root);

    if clear {
        state_manager.cleanup_state()?;
        config.success_println("Release state cleared");
        return Ok(());
    }

    if !has_recorded_release(&config.root) {
        if json {
            println!("{{\"status\": \"no_recorded_release\"}}");
        } else {
            config.println("No release recorded");
        }
        return Ok(());
    }

    let release_state = state_manager.load_state()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&release_state)?);
        return Ok(());
    }

    config.println(&release_state.summary());
    if let Some(failure) = &release_state.failure {
        config.indent(&failure.message);
    }

    if detailed {
        config.println(&format!("Release ID: {}", release_state.release_id));
        config.println(&format!("Started: {}", release_state.started_at));
        config.println(&format!("Updated: {}", release_state.updated_at));

        if !release_state.checkpoints.is_empty() {
            config.println("\nCheckpoints:");
            for checkpoint in &release_state.checkpoints {
                match &checkpoint.detail {
                    Some(detail) if !detail.is_empty() => {
                        config.indent(&format!("✓ {} ({})", checkpoint.phase, detail))
                    }
                    _ => config.indent(&format!("✓ {}", checkpoint.phase)),
                }
            }
        }
    }

    Ok(())
}

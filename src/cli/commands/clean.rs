//! Clean command implementation.
//!
//! Removes the build output directory without running a release.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::packager::clean_output_dir;

use super::helpers::load_config_manifest;

/// Execute clean command
pub(super) fn execute_clean(config: &RuntimeConfig) -> Result<()> {
    let manifest = load_config_manifest(config)?;
    let dist = manifest.dist_dir(&config.root);

    if clean_output_dir(&dist)? {
        config.success_println(&format!("Removed {}", dist.display()));
    } else {
        config.println(&format!("Nothing to clean: {} does not exist", dist.display()));
    }
    Ok(())
}

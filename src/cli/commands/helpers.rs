//! Shared helper functions for command execution.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::metadata::{PackageManifest, load_manifest};
use crate::packager::{ReleasePlan, ToolOverrides};

/// Load the manifest named by the runtime config
pub(super) fn load_config_manifest(config: &RuntimeConfig) -> Result<PackageManifest> {
    let manifest = load_manifest(&config.config_path)?;
    config.verbose_println(&format!(
        "Loaded {} from {}",
        manifest.package.name,
        config.config_path.display()
    ));
    Ok(manifest)
}

/// Load the manifest and resolve the release plan, including the version
pub(super) fn load_plan(config: &RuntimeConfig) -> Result<(PackageManifest, ReleasePlan)> {
    let manifest = load_config_manifest(config)?;
    let plan = ReleasePlan::from_manifest(&manifest, &config.root, &ToolOverrides::from_env())?;

    if !plan.descriptor.is_semver() {
        config.verbose_println(&format!(
            "Version '{}' is not a semantic version; tagging it as-is",
            plan.descriptor
        ));
    }

    Ok((manifest, plan))
}

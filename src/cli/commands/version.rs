//! Version command implementation.

use crate::cli::RuntimeConfig;
use crate::error::Result;

use super::helpers::load_plan;

/// Execute version command
pub(super) fn execute_version(config: &RuntimeConfig, tag_only: bool) -> Result<()> {
    let (manifest, plan) = load_plan(config)?;

    // Plain stdout so the value can be captured by scripts, even with --quiet.
    if tag_only {
        println!("{}", plan.tag_name());
        return Ok(());
    }

    println!("{}", plan.descriptor);
    if config.is_verbose() {
        let source = manifest.version_source(&config.root)?;
        config.verbose_println(&format!("Source: {}", source));
        config.verbose_println(&format!("Tag: {}", plan.tag_name()));
    }
    Ok(())
}

//! Upload command implementation.
//!
//! Runs the full release: clean, build, publish, tag and push.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::packager::{
    CommandRunner, DryRunRunner, Packager, ReleaseOptions, ReleaseOutcome, SystemRunner,
};
use crate::state::create_state_manager;

use super::helpers::load_plan;

/// Execute upload command
pub(super) async fn execute_upload(
    config: &RuntimeConfig,
    dry_run: bool,
    no_push: bool,
) -> Result<()> {
    // Version problems surface here, before anything is deleted or spawned.
    let (manifest, plan) = load_plan(config)?;

    config.println(&format!(
        "Releasing {} {} (tag {})",
        manifest.package.name,
        plan.descriptor,
        plan.tag_name()
    ));
    if dry_run {
        config.warning_println("Dry run: commands are printed, nothing is executed");
    }

    let options = ReleaseOptions { dry_run, no_push };
    let push_hint = plan.push_command().display();

    let outcome = if dry_run {
        run_release(config, Packager::new(plan, options, DryRunRunner, config.output())).await?
    } else {
        let packager = Packager::new(plan, options, SystemRunner, config.output())
            .with_state_manager(create_state_manager(&config.root));
        run_release(config, packager).await?
    };

    report(config, &outcome, &push_hint);
    Ok(())
}

async fn run_release<R: CommandRunner>(
    config: &RuntimeConfig,
    packager: Packager<'_, R>,
) -> Result<ReleaseOutcome> {
    packager.check_tools()?;
    config.verbose_println(&format!(
        "Using {} and {}",
        packager.plan().python,
        packager.plan().upload_client
    ));
    packager.run().await
}

fn report(config: &RuntimeConfig, outcome: &ReleaseOutcome, push_hint: &str) {
    if outcome.dry_run {
        config.success_println(&format!("Dry run of {} complete", outcome.tag));
        return;
    }

    config.success_println(&format!("Released {}", outcome.tag));
    for artifact in &outcome.artifacts {
        if let Some(name) = artifact.file_name() {
            config.indent(&name.to_string_lossy());
        }
    }
    if !outcome.pushed {
        config.warning_println(&format!(
            "Tag {} was not pushed; run '{}' when ready",
            outcome.tag, push_hint
        ));
    }
}

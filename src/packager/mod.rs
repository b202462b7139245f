//! Release packaging workflow.
//!
//! A release is four steps run strictly in order:
//!
//! 1. **clean** - remove the build output directory (absent is fine)
//! 2. **build** - `<python> setup.py sdist bdist_wheel --universal`
//! 3. **publish** - `<upload client> upload <every file in dist>`
//! 4. **tag** - `git tag v<version>` then `git push --tags`
//!
//! The first step that fails stops the run; nothing after it is invoked and
//! nothing before it is rolled back.

mod runner;

pub use runner::{CommandOutput, CommandRunner, DryRunRunner, StepCommand, SystemRunner};

use crate::cli::OutputManager;
use crate::error::{ReleaseError, Result, StepError};
use crate::metadata::PackageManifest;
use crate::state::{ReleasePhase, ReleaseState, StateManager};
use crate::version::ReleaseDescriptor;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable overriding the build interpreter
pub const PYTHON_ENV: &str = "PYMICRODOSE_RELEASE_PYTHON";

/// Environment variable overriding the upload client
pub const UPLOADER_ENV: &str = "PYMICRODOSE_RELEASE_UPLOADER";

/// One step of the release sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStep {
    /// Remove previous build output
    Clean,
    /// Build source and wheel distributions
    Build,
    /// Upload distributions to the package index
    Publish,
    /// Create and push the version tag
    Tag,
}

impl ReleaseStep {
    /// All steps in execution order
    pub const SEQUENCE: [ReleaseStep; 4] = [
        ReleaseStep::Clean,
        ReleaseStep::Build,
        ReleaseStep::Publish,
        ReleaseStep::Tag,
    ];

    /// Short lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            ReleaseStep::Clean => "clean",
            ReleaseStep::Build => "build",
            ReleaseStep::Publish => "publish",
            ReleaseStep::Tag => "tag",
        }
    }

    /// Phase reached once this step succeeds
    pub fn phase(&self) -> ReleasePhase {
        match self {
            ReleaseStep::Clean => ReleasePhase::Cleaned,
            ReleaseStep::Build => ReleasePhase::Built,
            ReleaseStep::Publish => ReleasePhase::Published,
            ReleaseStep::Tag => ReleasePhase::Tagged,
        }
    }
}

impl fmt::Display for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Switches for a release run
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseOptions {
    /// Print commands without running them or deleting anything
    pub dry_run: bool,
    /// Create the tag but do not push it
    pub no_push: bool,
}

/// Tool names overriding the manifest
#[derive(Debug, Clone, Default)]
pub struct ToolOverrides {
    /// Interpreter used for the build step
    pub python: Option<String>,
    /// Upload client executable
    pub upload_client: Option<String>,
}

impl ToolOverrides {
    /// Read overrides from the environment; empty values are ignored
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            python: read(PYTHON_ENV),
            upload_client: read(UPLOADER_ENV),
        }
    }
}

/// Everything needed to run the release steps, resolved up front
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    /// Project root (directory holding release.toml and setup.py)
    pub root: PathBuf,
    /// Build output directory
    pub dist_dir: PathBuf,
    /// Build interpreter
    pub python: String,
    /// Upload client
    pub upload_client: String,
    /// Remote for the tag push; git's default when `None`
    pub remote: Option<String>,
    /// Resolved version
    pub descriptor: ReleaseDescriptor,
}

impl ReleasePlan {
    /// Resolve the plan from a manifest.
    ///
    /// The version is resolved here, so a bad version source fails before
    /// any file is touched or any process is started.
    pub fn from_manifest(
        manifest: &PackageManifest,
        root: &Path,
        overrides: &ToolOverrides,
    ) -> Result<Self> {
        let source = manifest.version_source(root)?;
        let descriptor = source.resolve()?;
        log::debug!("Resolved version {} from {}", descriptor, source);

        let python = overrides
            .python
            .clone()
            .or_else(|| manifest.release.python.clone())
            .unwrap_or_else(default_python);

        let upload_client = overrides
            .upload_client
            .clone()
            .unwrap_or_else(|| manifest.release.upload_client.clone());

        Ok(Self {
            root: root.to_path_buf(),
            dist_dir: manifest.dist_dir(root),
            python,
            upload_client,
            remote: manifest.release.remote.clone(),
            descriptor,
        })
    }

    /// Tag name for the release
    pub fn tag_name(&self) -> String {
        self.descriptor.tag_name()
    }

    /// Build step command
    pub fn build_command(&self) -> StepCommand {
        StepCommand::new(
            &self.python,
            ["setup.py", "sdist", "bdist_wheel", "--universal"],
            &self.root,
        )
    }

    /// Upload step command for the given artifacts
    pub fn publish_command(&self, artifacts: &[PathBuf]) -> StepCommand {
        let args = std::iter::once("upload".to_string())
            .chain(artifacts.iter().map(|p| p.display().to_string()));
        StepCommand::new(&self.upload_client, args, &self.root)
    }

    /// Tag step commands; the push is omitted when `push` is false
    pub fn tag_commands(&self, push: bool) -> Vec<StepCommand> {
        let mut commands = vec![StepCommand::new(
            "git",
            ["tag".to_string(), self.tag_name()],
            &self.root,
        )];
        if push {
            commands.push(self.push_command());
        }
        commands
    }

    /// Tag push, to the configured remote or git's default
    pub fn push_command(&self) -> StepCommand {
        let mut args = vec!["push".to_string()];
        args.extend(self.remote.clone());
        args.push("--tags".to_string());
        StepCommand::new("git", args, &self.root)
    }

    /// External tools the release needs
    pub fn required_tools(&self) -> [&str; 3] {
        [&self.python, &self.upload_client, "git"]
    }
}

fn default_python() -> String {
    if which::which("python3").is_ok() {
        "python3".to_string()
    } else {
        "python".to_string()
    }
}

/// Result of a completed release
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseOutcome {
    /// Released version
    pub version: String,
    /// Created tag
    pub tag: String,
    /// Uploaded files
    pub artifacts: Vec<PathBuf>,
    /// Whether tags were pushed
    pub pushed: bool,
    /// Whether commands were only printed
    pub dry_run: bool,
}

/// Remove the build output directory.
///
/// Returns whether anything was removed. A missing directory is success;
/// any other failure is returned.
pub fn clean_output_dir(dir: &Path) -> Result<bool> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(StepError::CleanFailed {
            path: dir.to_path_buf(),
            source,
        }
        .into()),
    }
}

/// Files in the output directory, sorted, skipping dotfiles
pub fn collect_artifacts(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ReleaseError::Io(e)),
    };

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && entry.file_type()?.is_file() {
            artifacts.push(entry.path());
        }
    }
    artifacts.sort();
    Ok(artifacts)
}

/// Runs the release sequence
pub struct Packager<'a, R> {
    plan: ReleasePlan,
    options: ReleaseOptions,
    runner: R,
    output: &'a OutputManager,
    state_manager: Option<StateManager>,
}

impl<'a, R: CommandRunner> Packager<'a, R> {
    /// Create a packager
    pub fn new(
        plan: ReleasePlan,
        options: ReleaseOptions,
        runner: R,
        output: &'a OutputManager,
    ) -> Self {
        Self {
            plan,
            options,
            runner,
            output,
            state_manager: None,
        }
    }

    /// Persist the run's state after every phase
    pub fn with_state_manager(mut self, state_manager: StateManager) -> Self {
        self.state_manager = Some(state_manager);
        self
    }

    /// The resolved plan
    pub fn plan(&self) -> &ReleasePlan {
        &self.plan
    }

    /// The runner driving external commands
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Fail if a required tool is missing. Dry runs skip the check.
    pub fn check_tools(&self) -> Result<()> {
        if self.options.dry_run {
            return Ok(());
        }
        for tool in self.plan.required_tools() {
            if !self.runner.is_available(tool) {
                return Err(StepError::ToolNotFound {
                    tool: tool.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Run clean, build, publish and tag in order, stopping at the first failure
    pub async fn run(&self) -> Result<ReleaseOutcome> {
        let tag = self.plan.tag_name();
        let mut state = ReleaseState::new(
            self.plan.descriptor.version(),
            &tag,
            self.options.dry_run,
        );
        self.persist(&state);

        let mut outcome = ReleaseOutcome {
            version: self.plan.descriptor.version().to_string(),
            tag,
            artifacts: Vec::new(),
            pushed: false,
            dry_run: self.options.dry_run,
        };

        for step in ReleaseStep::SEQUENCE {
            match self.run_step(step, &mut outcome).await {
                Ok(detail) => {
                    state.advance(step.phase(), detail)?;
                    self.persist(&state);
                }
                Err(e) => {
                    log::debug!("{} step failed: {}", step, e);
                    state.fail(step.name(), e.to_string());
                    self.persist(&state);
                    return Err(e);
                }
            }
        }

        Ok(outcome)
    }

    async fn run_step(
        &self,
        step: ReleaseStep,
        outcome: &mut ReleaseOutcome,
    ) -> Result<Option<String>> {
        match step {
            ReleaseStep::Clean => {
                self.clean()?;
                Ok(Some(self.plan.dist_dir.display().to_string()))
            }
            ReleaseStep::Build => {
                self.build().await?;
                Ok(None)
            }
            ReleaseStep::Publish => {
                outcome.artifacts = self.publish().await?;
                let names: Vec<String> = outcome
                    .artifacts
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect();
                Ok(Some(names.join(", ")))
            }
            ReleaseStep::Tag => {
                outcome.pushed = self.tag_and_push().await?;
                Ok(Some(outcome.tag.clone()))
            }
        }
    }

    /// Remove previous build output
    pub fn clean(&self) -> Result<()> {
        let _ = self.output.section("Removing previous builds...");
        let dist = &self.plan.dist_dir;

        if self.options.dry_run {
            let _ = self.output.indent(&format!("Would remove {}", dist.display()));
            return Ok(());
        }

        if clean_output_dir(dist)? {
            log::debug!("Removed {}", dist.display());
        } else {
            log::debug!("{} did not exist", dist.display());
        }
        Ok(())
    }

    /// Build source and wheel distributions
    pub async fn build(&self) -> Result<()> {
        let _ = self
            .output
            .section("Building source and wheel distribution...");
        self.execute(ReleaseStep::Build, &self.plan.build_command())
            .await
    }

    /// Upload every file in the output directory; returns the uploaded files
    pub async fn publish(&self) -> Result<Vec<PathBuf>> {
        let _ = self.output.section(&format!(
            "Uploading the package via {}...",
            self.plan.upload_client
        ));

        let mut artifacts = collect_artifacts(&self.plan.dist_dir)?;
        if artifacts.is_empty() {
            if !self.options.dry_run {
                return Err(StepError::NoArtifacts {
                    dir: self.plan.dist_dir.clone(),
                }
                .into());
            }
            // Nothing is built during a dry run; show the pattern instead.
            artifacts.push(self.plan.dist_dir.join("*"));
        }

        self.execute(
            ReleaseStep::Publish,
            &self.plan.publish_command(&artifacts),
        )
        .await?;
        Ok(artifacts)
    }

    /// Create the version tag and push tags; returns whether a push happened
    pub async fn tag_and_push(&self) -> Result<bool> {
        let _ = self.output.section("Pushing git tags...");
        let push = !self.options.no_push;
        for command in self.plan.tag_commands(push) {
            self.execute(ReleaseStep::Tag, &command).await?;
        }
        if !push {
            let _ = self.output.indent("Skipped push (--no-push)");
        }
        Ok(push)
    }

    async fn execute(&self, step: ReleaseStep, command: &StepCommand) -> Result<()> {
        let command_line = command.display();
        let _ = self.output.command(&command_line);

        let output = self
            .runner
            .run(command)
            .await
            .map_err(|source| StepError::Spawn {
                step,
                command: command_line.clone(),
                source,
            })?;

        if !output.is_success() {
            return Err(StepError::Failed {
                step,
                command: command_line,
                code: output.code,
                stderr: output.stderr,
            }
            .into());
        }
        Ok(())
    }

    fn persist(&self, state: &ReleaseState) {
        if let Some(manager) = &self.state_manager
            && let Err(e) = manager.save_state(state)
        {
            let _ = self
                .output
                .warn(&format!("Could not record release state: {}", e));
        }
    }
}

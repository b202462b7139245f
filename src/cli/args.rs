//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::metadata::MANIFEST_FILE;

/// Release packager for the pymicrodose library
#[derive(Parser, Debug)]
#[command(
    name = "pymicrodose_release",
    version,
    about = "Build, upload and tag a pymicrodose release",
    long_about = "Cut and publish a release of a setup.py-based package.

The upload command runs, in order and stopping at the first failure:
  1. remove the previous build output (dist/)
  2. <python> setup.py sdist bdist_wheel --universal
  3. twine upload dist/*
  4. git tag v<version> && git push --tags

Package metadata and the release version are read from release.toml."
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to release.toml
    #[arg(
        short,
        long,
        global = true,
        value_name = "PATH",
        default_value = MANIFEST_FILE,
        env = "PYMICRODOSE_RELEASE_CONFIG"
    )]
    pub config: PathBuf,

    /// Show extra detail
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build and publish the package, then tag and push
    Upload {
        /// Print the commands without running them or deleting anything
        #[arg(long)]
        dry_run: bool,

        /// Create the tag locally but do not push it
        #[arg(long)]
        no_push: bool,
    },

    /// Remove previous build output
    Clean,

    /// Print the resolved version and tag name
    Version {
        /// Print only the tag name
        #[arg(long)]
        tag: bool,
    },

    /// Show the declared package metadata
    Metadata {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the outcome of the last recorded release
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show checkpoints
        #[arg(long)]
        detailed: bool,

        /// Delete the recorded state instead of showing it
        #[arg(long, conflicts_with_all = ["json", "detailed"])]
        clear: bool,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Upload { .. } => "upload",
            Command::Clean => "clean",
            Command::Version { .. } => "version",
            Command::Metadata { .. } => "metadata",
            Command::Status { .. } => "status",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.config.as_os_str().is_empty() {
            return Err("--config must not be empty".to_string());
        }
        if self.config.is_dir() {
            return Err(format!(
                "--config points to a directory: {} (expected a {} file)",
                self.config.display(),
                MANIFEST_FILE
            ));
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug)]
pub struct RuntimeConfig {
    output: super::OutputManager,
    /// Manifest path
    pub config_path: PathBuf,
    /// Project root: the manifest's directory
    pub root: PathBuf,
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
            config_path: args.config.clone(),
            root: project_root(&args.config),
        }
    }
}

/// Directory containing the manifest; `.` for a bare file name
pub fn project_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

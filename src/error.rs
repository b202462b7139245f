//! Error types for pymicrodose_release operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pymicrodose_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all pymicrodose_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Manifest and version configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Release step errors
    #[error("Release step error: {0}")]
    Step(#[from] StepError),

    /// State management errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Manifest and version resolution errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// release.toml not found
    #[error("Release manifest not found at {path}")]
    ManifestNotFound {
        /// Path where release.toml was expected
        path: PathBuf,
    },

    /// release.toml could not be parsed
    #[error("Failed to parse release manifest {path}: {reason}")]
    ManifestInvalid {
        /// Path to the manifest
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Version file could not be read
    #[error("Failed to read version file {path}: {source}")]
    VersionFileUnreadable {
        /// Path to the version file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Version attribute missing from the version file
    #[error("Version file {path} does not define '{key}'")]
    VersionNotFound {
        /// Path to the version file
        path: PathBuf,
        /// Attribute name that was looked up
        key: String,
    },

    /// Version attribute defined more than once
    #[error("Version file {path} defines '{key}' {count} times, expected exactly once")]
    VersionDefinedMultipleTimes {
        /// Path to the version file
        path: PathBuf,
        /// Attribute name
        key: String,
        /// Number of definitions found
        count: usize,
    },

    /// Resolved version is empty
    #[error("Resolved version is empty")]
    EmptyVersion,

    /// No package declared, so no default version file can be derived
    #[error("No version configured and no package declared to locate a version file")]
    NoVersionSource,
}

/// Errors raised while running a release step
#[derive(Error, Debug)]
pub enum StepError {
    /// External tool missing from PATH
    #[error("Required tool '{tool}' not found on PATH")]
    ToolNotFound {
        /// Tool name
        tool: String,
    },

    /// Output directory could not be removed
    #[error("Failed to remove {path}: {source}")]
    CleanFailed {
        /// Directory being removed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Process could not be started
    #[error("{step} step could not start '{command}': {source}")]
    Spawn {
        /// Step that failed
        step: crate::packager::ReleaseStep,
        /// Command line
        command: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Process exited unsuccessfully
    #[error("{step} step failed: '{command}' exited with {}{}", exit_label(.code), stderr_suffix(.stderr))]
    Failed {
        /// Step that failed
        step: crate::packager::ReleaseStep,
        /// Command line
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Build left nothing to upload
    #[error("No artifacts found in {dir}; nothing to upload")]
    NoArtifacts {
        /// Output directory
        dir: PathBuf,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// State management errors
#[derive(Error, Debug)]
pub enum StateError {
    /// State file corrupted
    #[error("State file corrupted: {reason}")]
    Corrupted {
        /// Reason for the error
        reason: String,
    },

    /// State file not found
    #[error("State file not found. No release has been recorded.")]
    NotFound,

    /// State version mismatch
    #[error("State file version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Found version
        found: String,
    },

    /// Failed to save state
    #[error("Failed to save state: {reason}")]
    SaveFailed {
        /// Reason for the error
        reason: String,
    },

    /// Failed to load state
    #[error("Failed to load state: {reason}")]
    LoadFailed {
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config(ConfigError::ManifestNotFound { .. }) => vec![
                "Run from the project root or pass --config <path/to/release.toml>".to_string(),
            ],
            ReleaseError::Config(ConfigError::VersionNotFound { path, key }) => vec![
                format!("Add a line like {} = '1.0.0' to {}", key, path.display()),
                "Or set [package] version in release.toml".to_string(),
            ],
            ReleaseError::Config(ConfigError::VersionDefinedMultipleTimes { path, key, .. }) => {
                vec![format!(
                    "Keep a single {} assignment in {}",
                    key,
                    path.display()
                )]
            }
            ReleaseError::Step(StepError::ToolNotFound { tool }) => vec![
                format!("Install '{}' and make sure it is on PATH", tool),
                "Override the interpreter with PYMICRODOSE_RELEASE_PYTHON".to_string(),
                "Override the upload client with PYMICRODOSE_RELEASE_UPLOADER".to_string(),
            ],
            ReleaseError::Step(StepError::Failed { step, .. }) => match step {
                crate::packager::ReleaseStep::Build => vec![
                    "Check that setuptools and wheel are installed: pip install setuptools wheel"
                        .to_string(),
                ],
                crate::packager::ReleaseStep::Publish => vec![
                    "Verify index credentials (~/.pypirc or TWINE_USERNAME/TWINE_PASSWORD)"
                        .to_string(),
                    "Versions already on the index cannot be re-uploaded; bump the version"
                        .to_string(),
                ],
                crate::packager::ReleaseStep::Tag => vec![
                    "Check whether the tag already exists: git tag --list".to_string(),
                    "Verify git remote access: git remote -v".to_string(),
                ],
                crate::packager::ReleaseStep::Clean => Vec::new(),
            },
            ReleaseError::Step(StepError::NoArtifacts { .. }) => vec![
                "Run the build step manually to see why no distributions were produced"
                    .to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

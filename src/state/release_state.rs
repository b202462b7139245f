//! Release state tracking and serialization.

use crate::error::{Result, StateError};
use serde::{Deserialize, Serialize};

/// Current version of the state format
pub const STATE_FORMAT_VERSION: u32 = 1;

/// Record of a release run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseState {
    /// Version of the state format
    pub format_version: u32,
    /// Unique ID for this release run
    pub release_id: String,
    /// Version being released
    pub release_version: String,
    /// Tag created for the release
    pub tag: String,
    /// Whether commands were only printed
    #[serde(default)]
    pub dry_run: bool,
    /// Timestamp when the run started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Timestamp of the last transition
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Phase reached so far
    pub current_phase: ReleasePhase,
    /// Phases completed, in order
    pub checkpoints: Vec<ReleaseCheckpoint>,
    /// Failure that stopped the run, if any
    pub failure: Option<ReleaseFailure>,
}

/// Phase of the release run.
///
/// Runs move strictly forward `Pending → Cleaned → Built → Published → Tagged`;
/// any step can divert to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReleasePhase {
    /// Nothing done yet
    Pending,
    /// Output directory removed
    Cleaned,
    /// Source and wheel distributions built
    Built,
    /// Distributions uploaded
    Published,
    /// Tag created (and pushed unless disabled)
    Tagged,
    /// A step failed
    Failed,
}

/// Completed phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseCheckpoint {
    /// Phase reached
    pub phase: ReleasePhase,
    /// When it was reached
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Extra details (artifact names, tag, ...)
    pub detail: Option<String>,
}

/// Failure that ended the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseFailure {
    /// Name of the step that failed
    pub step: String,
    /// Error message
    pub message: String,
    /// When it happened
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ReleaseState {
    /// Create a state for a new run
    pub fn new(release_version: &str, tag: &str, dry_run: bool) -> Self {
        let now = chrono::Utc::now();
        Self {
            format_version: STATE_FORMAT_VERSION,
            release_id: format!("release-{}-{}", release_version, now.timestamp()),
            release_version: release_version.to_string(),
            tag: tag.to_string(),
            dry_run,
            started_at: now,
            updated_at: now,
            current_phase: ReleasePhase::Pending,
            checkpoints: Vec::new(),
            failure: None,
        }
    }

    /// Move to the next phase.
    ///
    /// Only forward moves are accepted; a failed run stays failed.
    pub fn advance(&mut self, phase: ReleasePhase, detail: Option<String>) -> Result<()> {
        if self.current_phase == ReleasePhase::Failed
            || phase == ReleasePhase::Failed
            || phase <= self.current_phase
        {
            return Err(StateError::Corrupted {
                reason: format!(
                    "Invalid phase transition {} -> {}",
                    self.current_phase, phase
                ),
            }
            .into());
        }

        let now = chrono::Utc::now();
        self.checkpoints.push(ReleaseCheckpoint {
            phase,
            timestamp: now,
            detail,
        });
        self.current_phase = phase;
        self.updated_at = now;
        Ok(())
    }

    /// Mark the run as failed at `step`
    pub fn fail(&mut self, step: &str, message: String) {
        let now = chrono::Utc::now();
        self.failure = Some(ReleaseFailure {
            step: step.to_string(),
            message,
            timestamp: now,
        });
        self.current_phase = ReleasePhase::Failed;
        self.updated_at = now;
    }

    /// Check if a specific phase has been completed
    pub fn has_completed(&self, phase: ReleasePhase) -> bool {
        self.checkpoints.iter().any(|cp| cp.phase == phase)
    }

    /// Whether the run reached its terminal success state
    pub fn is_complete(&self) -> bool {
        self.current_phase == ReleasePhase::Tagged
    }

    /// Get elapsed time
    pub fn elapsed_time(&self) -> chrono::Duration {
        self.updated_at - self.started_at
    }

    /// Validate state consistency
    pub fn validate(&self) -> Result<()> {
        if self.format_version != STATE_FORMAT_VERSION {
            return Err(StateError::VersionMismatch {
                expected: STATE_FORMAT_VERSION.to_string(),
                found: self.format_version.to_string(),
            }
            .into());
        }
        if self.current_phase == ReleasePhase::Failed && self.failure.is_none() {
            return Err(StateError::Corrupted {
                reason: "Failed phase recorded without a failure".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Create a summary of the release state
    pub fn summary(&self) -> String {
        let mode = if self.dry_run { " [dry run]" } else { "" };
        match &self.failure {
            Some(failure) => format!(
                "Release {}{} failed during {} after {}",
                self.tag,
                mode,
                failure.step,
                format_duration(self.elapsed_time())
            ),
            None => format!(
                "Release {}{} ({}) - {} elapsed",
                self.tag,
                mode,
                self.current_phase,
                format_duration(self.elapsed_time())
            ),
        }
    }
}

fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

impl std::fmt::Display for ReleasePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleasePhase::Pending => write!(f, "Pending"),
            ReleasePhase::Cleaned => write!(f, "Cleaned"),
            ReleasePhase::Built => write!(f, "Built"),
            ReleasePhase::Published => write!(f, "Published"),
            ReleasePhase::Tagged => write!(f, "Tagged"),
            ReleasePhase::Failed => write!(f, "Failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_advance_in_order() {
        let mut state = ReleaseState::new("1.1.2", "v1.1.2", false);
        assert_eq!(state.current_phase, ReleasePhase::Pending);

        for phase in [
            ReleasePhase::Cleaned,
            ReleasePhase::Built,
            ReleasePhase::Published,
            ReleasePhase::Tagged,
        ] {
            state.advance(phase, None).unwrap();
        }

        assert!(state.is_complete());
        assert!(state.has_completed(ReleasePhase::Built));
        assert_eq!(state.checkpoints.len(), 4);
    }

    #[test]
    fn backward_and_repeated_moves_are_rejected() {
        let mut state = ReleaseState::new("1.0", "v1.0", false);
        state.advance(ReleasePhase::Built, None).unwrap();
        assert!(state.advance(ReleasePhase::Cleaned, None).is_err());
        assert!(state.advance(ReleasePhase::Built, None).is_err());
    }

    #[test]
    fn failed_is_terminal() {
        let mut state = ReleaseState::new("1.0", "v1.0", false);
        state.advance(ReleasePhase::Cleaned, None).unwrap();
        state.fail("build", "exit 1".to_string());

        assert_eq!(state.current_phase, ReleasePhase::Failed);
        assert!(state.advance(ReleasePhase::Built, None).is_err());
        assert!(state.summary().contains("failed during build"));
        state.validate().unwrap();
    }

    #[test]
    fn validate_rejects_foreign_format() {
        let mut state = ReleaseState::new("1.0", "v1.0", true);
        state.format_version = 99;
        assert!(state.validate().is_err());
    }
}

//! State persistence for release runs.
//!
//! The state file is written atomically (temp file + rename) after every
//! phase so an interrupted run still leaves an accurate record.

use crate::error::{Result, StateError};
use crate::state::ReleaseState;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads and writes the release state file
#[derive(Debug, Clone)]
pub struct StateManager {
    state_file_path: PathBuf,
}

impl StateManager {
    /// Create a new state manager
    pub fn new<P: AsRef<Path>>(state_file_path: P) -> Self {
        Self {
            state_file_path: state_file_path.as_ref().to_path_buf(),
        }
    }

    /// Path of the managed state file
    pub fn path(&self) -> &Path {
        &self.state_file_path
    }

    /// Save release state to file
    pub fn save_state(&self, state: &ReleaseState) -> Result<()> {
        state.validate()?;

        let serialized =
            serde_json::to_string_pretty(state).map_err(|e| StateError::SaveFailed {
                reason: format!("Failed to serialize state: {}", e),
            })?;

        let temp_file_path = self.state_file_path.with_extension("tmp");
        {
            let mut file =
                fs::File::create(&temp_file_path).map_err(|e| StateError::SaveFailed {
                    reason: format!("Failed to create temp file: {}", e),
                })?;

            file.write_all(serialized.as_bytes())
                .map_err(|e| StateError::SaveFailed {
                    reason: format!("Failed to write state: {}", e),
                })?;

            file.sync_all().map_err(|e| StateError::SaveFailed {
                reason: format!("Failed to sync file: {}", e),
            })?;
        }

        fs::rename(&temp_file_path, &self.state_file_path).map_err(|e| StateError::SaveFailed {
            reason: format!("Failed to rename temp file: {}", e),
        })?;

        log::debug!("Saved release state to {}", self.state_file_path.display());
        Ok(())
    }

    /// Load release state from file
    pub fn load_state(&self) -> Result<ReleaseState> {
        let contents = match fs::read_to_string(&self.state_file_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StateError::NotFound.into());
            }
            Err(e) => {
                return Err(StateError::LoadFailed {
                    reason: format!(
                        "Failed to read file {}: {}",
                        self.state_file_path.display(),
                        e
                    ),
                }
                .into());
            }
        };

        let state: ReleaseState =
            serde_json::from_str(&contents).map_err(|e| StateError::Corrupted {
                reason: format!("Failed to deserialize state: {}", e),
            })?;

        state.validate()?;
        Ok(state)
    }

    /// Check if state file exists
    pub fn state_exists(&self) -> bool {
        self.state_file_path.exists()
    }

    /// Delete the state file; a missing file is not an error
    pub fn cleanup_state(&self) -> Result<()> {
        match fs::remove_file(&self.state_file_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::SaveFailed {
                reason: format!("Failed to remove state file: {}", e),
            }
            .into()),
        }
    }
}

//! State management for release runs.
//!
//! Tracks which phase the last run reached and why it stopped, persisted
//! next to the manifest so `status` can report it later.

mod manager;
mod release_state;

pub use manager::StateManager;
pub use release_state::{
    ReleaseCheckpoint, ReleaseFailure, ReleasePhase, ReleaseState, STATE_FORMAT_VERSION,
};

use std::path::{Path, PathBuf};

/// State file name, created in the project root
pub const STATE_FILE_NAME: &str = ".pymicrodose_release_state.json";

/// Path of the state file for a project root
pub fn state_file_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE_NAME)
}

/// Create a state manager for the given project root
pub fn create_state_manager(root: &Path) -> StateManager {
    StateManager::new(state_file_path(root))
}

/// Quick check if a release has been recorded for the project root
pub fn has_recorded_release(root: &Path) -> bool {
    state_file_path(root).exists()
}

//! # pymicrodose_release
//!
//! Release packager for the pymicrodose microdosimetric modeling library.
//!
//! One `upload` run removes the previous build output, builds source and
//! universal wheel distributions with `setup.py`, uploads them with twine,
//! then tags `v<version>` and pushes tags. Unlike a fire-and-forget script,
//! every external command's exit status is checked and the run stops at the
//! first failing step, naming it.
//!
//! ## Usage
//!
//! ```bash
//! pymicrodose_release upload             # clean, build, publish, tag and push
//! pymicrodose_release upload --dry-run   # print the commands only
//! pymicrodose_release version --tag      # v1.1.2
//! pymicrodose_release metadata --json    # declared package surface
//! pymicrodose_release status             # outcome of the last run
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod error;
pub mod metadata;
pub mod packager;
pub mod state;
pub mod version;

pub use cli::Args;
pub use error::{ConfigError, ReleaseError, Result, StepError};
pub use metadata::{PackageManifest, load_manifest, long_description};
pub use packager::{
    CommandRunner, Packager, ReleaseOptions, ReleaseOutcome, ReleasePlan, ReleaseStep,
    StepCommand,
};
pub use state::{ReleasePhase, ReleaseState, StateManager};
pub use version::{ReleaseDescriptor, VersionSource, tag_name};

//! Release version resolution.
//!
//! The version either comes from a constant in `release.toml` or, when that
//! is absent, from a Python module that assigns it exactly once
//! (`__version__ = '1.1.2'`). The constant always wins.

use crate::error::{ConfigError, Result};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default attribute looked up in a version file
pub const DEFAULT_VERSION_KEY: &str = "__version__";

/// Where the release version is taken from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// Version set directly in the manifest
    UseConstant(String),
    /// Version read from an assignment in a module file
    ReadFromFile {
        /// Path to the module file
        path: PathBuf,
        /// Attribute name assigned in the file
        key: String,
    },
}

/// The resolved release version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    version: String,
}

impl VersionSource {
    /// Resolve this source into a release descriptor.
    ///
    /// Reading from a file fails unless the key is assigned exactly once.
    pub fn resolve(&self) -> Result<ReleaseDescriptor> {
        let version = match self {
            Self::UseConstant(value) => value.trim().to_string(),
            Self::ReadFromFile { path, key } => read_version_file(path, key)?,
        };
        ReleaseDescriptor::new(version)
    }
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseConstant(_) => write!(f, "release.toml"),
            Self::ReadFromFile { path, key } => write!(f, "{} in {}", key, path.display()),
        }
    }
}

impl ReleaseDescriptor {
    /// Create a descriptor, rejecting empty versions
    pub fn new(version: impl Into<String>) -> Result<Self> {
        let version = version.into();
        if version.is_empty() {
            return Err(ConfigError::EmptyVersion.into());
        }
        Ok(Self { version })
    }

    /// The version string exactly as configured
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Tag name for this release: `v` followed by the version
    pub fn tag_name(&self) -> String {
        tag_name(&self.version)
    }

    /// Whether the version also parses as a semantic version
    pub fn is_semver(&self) -> bool {
        semver::Version::parse(&self.version).is_ok()
    }
}

impl fmt::Display for ReleaseDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

/// Build the tag name for a version
pub fn tag_name(version: &str) -> String {
    format!("v{}", version)
}

/// Read `key = '<value>'` from a module file.
pub fn read_version_file(path: &Path, key: &str) -> Result<String> {
    let content =
        std::fs::read_to_string(path).map_err(|source| ConfigError::VersionFileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let definitions = find_definitions(&content, key);
    match definitions.as_slice() {
        [] => Err(ConfigError::VersionNotFound {
            path: path.to_path_buf(),
            key: key.to_string(),
        }
        .into()),
        [version] => {
            log::debug!("Read {} = {:?} from {}", key, version, path.display());
            Ok(version.clone())
        }
        many => Err(ConfigError::VersionDefinedMultipleTimes {
            path: path.to_path_buf(),
            key: key.to_string(),
            count: many.len(),
        }
        .into()),
    }
}

/// Collect every top-level string assignment to `key`
fn find_definitions(content: &str, key: &str) -> Vec<String> {
    let pattern = format!(
        r#"^{}\s*(?::\s*str\s*)?=\s*(?:'([^']*)'|"([^"]*)")\s*(?:#.*)?$"#,
        regex::escape(key)
    );
    // The key is escaped, so the pattern is always valid.
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    content
        .lines()
        .filter_map(|line| re.captures(line.trim_end()))
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

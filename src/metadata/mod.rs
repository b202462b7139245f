//! Package manifest (`release.toml`) and long-description loading.

use crate::error::{ConfigError, Result};
use crate::version::{DEFAULT_VERSION_KEY, VersionSource};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default manifest file name
pub const MANIFEST_FILE: &str = "release.toml";

/// Parsed `release.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageManifest {
    /// Declared package surface
    pub package: PackageMetadata,

    /// Fallback version file, used when `package.version` is unset
    #[serde(default)]
    pub version_file: Option<VersionFileConfig>,

    /// Release tooling settings
    #[serde(default)]
    pub release: ReleaseSettings,
}

/// Metadata published with the distribution
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageMetadata {
    /// Distribution name on the package index
    pub name: String,

    /// One-line description
    pub description: String,

    /// Release version; when absent the version file is consulted
    #[serde(default)]
    pub version: Option<String>,

    /// Project URL
    #[serde(default)]
    pub url: Option<String>,

    /// Author name
    #[serde(default)]
    pub author: Option<String>,

    /// Author email
    #[serde(default)]
    pub email: Option<String>,

    /// Minimum interpreter version specifier (e.g. ">=3.6.0")
    #[serde(default)]
    pub requires_python: Option<String>,

    /// SPDX-ish license name
    #[serde(default)]
    pub license: Option<String>,

    /// README path, relative to the project root
    #[serde(default = "default_readme")]
    pub readme: PathBuf,

    /// Trove classifiers
    #[serde(default)]
    pub classifiers: Vec<String>,

    /// Required runtime dependencies
    #[serde(default)]
    pub install_requires: Vec<String>,

    /// Optional dependency groups (e.g. `plots`)
    #[serde(default)]
    pub extras: BTreeMap<String, Vec<String>>,

    /// Importable packages and where their sources live
    #[serde(default)]
    pub layout: PackageLayout,
}

/// Package directory layout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageLayout {
    /// Importable package names
    #[serde(default)]
    pub packages: Vec<String>,

    /// Package name to source directory mapping
    #[serde(default)]
    pub package_dir: BTreeMap<String, PathBuf>,

    /// Package name to data-file glob patterns, relative to the package directory
    #[serde(default)]
    pub package_data: BTreeMap<String, Vec<String>>,
}

/// Location of the fallback version attribute
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionFileConfig {
    /// Path relative to the project root
    pub path: PathBuf,

    /// Attribute name
    #[serde(default = "default_version_key")]
    pub key: String,
}

/// Release tooling settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseSettings {
    /// Build output directory, relative to the project root
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,

    /// Interpreter used to run setup.py
    #[serde(default)]
    pub python: Option<String>,

    /// Upload client executable
    #[serde(default = "default_upload_client")]
    pub upload_client: String,

    /// Remote to push tags to; git's default remote when unset
    #[serde(default)]
    pub remote: Option<String>,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            dist_dir: default_dist_dir(),
            python: None,
            upload_client: default_upload_client(),
            remote: None,
        }
    }
}

fn default_readme() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_version_key() -> String {
    DEFAULT_VERSION_KEY.to_string()
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_upload_client() -> String {
    "twine".to_string()
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<PackageManifest> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::ManifestNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    })?;

    parse_manifest(&content, path)
}

/// Parse manifest text; `path` is only used for error messages
pub fn parse_manifest(content: &str, path: &Path) -> Result<PackageManifest> {
    let manifest: PackageManifest =
        toml::from_str(content).map_err(|e| ConfigError::ManifestInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if manifest.package.name.trim().is_empty() {
        return Err(ConfigError::ManifestInvalid {
            path: path.to_path_buf(),
            reason: "[package] name must not be empty".to_string(),
        }
        .into());
    }

    Ok(manifest)
}

impl PackageManifest {
    /// Decide where the version comes from. The constant takes precedence;
    /// otherwise the configured version file, otherwise
    /// `<first package>/__version__.py`.
    pub fn version_source(&self, root: &Path) -> Result<VersionSource> {
        // An empty constant counts as unset.
        if let Some(version) = self.package.version.as_deref()
            && !version.trim().is_empty()
        {
            return Ok(VersionSource::UseConstant(version.trim().to_string()));
        }

        if let Some(file) = &self.version_file {
            return Ok(VersionSource::ReadFromFile {
                path: root.join(&file.path),
                key: file.key.clone(),
            });
        }

        let slug = self
            .package
            .layout
            .packages
            .first()
            .ok_or(ConfigError::NoVersionSource)?;

        Ok(VersionSource::ReadFromFile {
            path: root.join(slug).join("__version__.py"),
            key: DEFAULT_VERSION_KEY.to_string(),
        })
    }

    /// Build output directory under `root`
    pub fn dist_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.release.dist_dir)
    }

    /// Data files matched by the `package_data` patterns, sorted per package.
    ///
    /// Patterns resolve against the package's mapped directory, or a
    /// directory named after the package when it has no mapping.
    pub fn package_data_files(&self, root: &Path) -> Vec<(String, Vec<PathBuf>)> {
        let layout = &self.package.layout;
        layout
            .package_data
            .iter()
            .map(|(package, patterns)| {
                let base = layout
                    .package_dir
                    .get(package)
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(package));
                let base = root.join(base);

                let mut files: Vec<PathBuf> = patterns
                    .iter()
                    .filter_map(|pattern| {
                        let full = base.join(pattern);
                        match glob::glob(&full.to_string_lossy()) {
                            Ok(paths) => Some(paths),
                            Err(e) => {
                                log::warn!("Ignoring invalid data pattern '{}': {}", pattern, e);
                                None
                            }
                        }
                    })
                    .flatten()
                    .filter_map(|entry| entry.ok())
                    .filter(|path| path.is_file())
                    .collect();
                files.sort();
                files.dedup();

                (package.clone(), files)
            })
            .collect()
    }
}

/// Long description for the package index.
///
/// The README contents prefixed with a newline, or the short description
/// unchanged when the README cannot be read.
pub fn long_description(readme: &Path, short_description: &str) -> String {
    match std::fs::read_to_string(readme) {
        Ok(text) => format!("\n{}", text),
        Err(e) => {
            log::debug!(
                "README {} unreadable ({}); using short description",
                readme.display(),
                e
            );
            short_description.to_string()
        }
    }
}

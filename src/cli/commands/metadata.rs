//! Metadata command implementation.
//!
//! Shows the package surface declared in release.toml as the build would
//! see it: version, long-description source, dependencies and data files.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::metadata::long_description;
use serde_json::json;

use super::helpers::load_plan;

/// Execute metadata command
pub(super) fn execute_metadata(config: &RuntimeConfig, as_json: bool) -> Result<()> {
    let (manifest, plan) = load_plan(config)?;
    let package = &manifest.package;

    let readme = config.root.join(&package.readme);
    let long = long_description(&readme, &package.description);
    let readme_used = long != package.description;
    let data_files = manifest.package_data_files(&config.root);

    if as_json {
        let data: serde_json::Map<String, serde_json::Value> = data_files
            .iter()
            .map(|(name, files)| {
                let files: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
                (name.clone(), json!(files))
            })
            .collect();

        let value = json!({
            "name": package.name,
            "version": plan.descriptor.version(),
            "tag": plan.tag_name(),
            "description": package.description,
            "long_description_content_type": "text/markdown",
            "long_description_from_readme": readme_used,
            "url": package.url,
            "author": package.author,
            "author_email": package.email,
            "requires_python": package.requires_python,
            "license": package.license,
            "install_requires": package.install_requires,
            "extras_require": package.extras,
            "packages": package.layout.packages,
            "package_dir": package.layout.package_dir,
            "package_data": package.layout.package_data,
            "package_data_files": data,
            "classifiers": package.classifiers,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    config.println(&format!("{} {}", package.name, plan.descriptor));
    config.indent(&package.description);
    if let Some(url) = &package.url {
        config.indent(url);
    }
    match (&package.author, &package.email) {
        (Some(author), Some(email)) => config.indent(&format!("{} <{}>", author, email)),
        (Some(author), None) => config.indent(author),
        (None, Some(email)) => config.indent(email),
        (None, None) => {}
    }
    if let Some(license) = &package.license {
        config.indent(&format!("License: {}", license));
    }
    if let Some(requires) = &package.requires_python {
        config.indent(&format!("Requires Python: {}", requires));
    }
    config.indent(&format!(
        "Long description: {}",
        if readme_used {
            readme.display().to_string()
        } else {
            "short description (README unreadable)".to_string()
        }
    ));

    if !package.install_requires.is_empty() {
        config.println("Requires:");
        for dep in &package.install_requires {
            config.indent(dep);
        }
    }

    for (extra, deps) in &package.extras {
        config.println(&format!("Extra [{}]:", extra));
        for dep in deps {
            config.indent(dep);
        }
    }

    if !package.layout.packages.is_empty() {
        config.println("Packages:");
        for name in &package.layout.packages {
            match package.layout.package_dir.get(name) {
                Some(dir) => config.indent(&format!("{} -> {}", name, dir.display())),
                None => config.indent(name),
            }
        }
    }

    for (name, files) in &data_files {
        config.println(&format!("Data files for {} ({}):", name, files.len()));
        for file in files {
            let shown = file.strip_prefix(&config.root).unwrap_or(file);
            config.indent(&shown.display().to_string());
        }
    }

    if config.is_verbose() && !package.classifiers.is_empty() {
        config.println("Classifiers:");
        for classifier in &package.classifiers {
            config.indent(classifier);
        }
    }

    Ok(())
}

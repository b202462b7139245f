//! End-to-end tests of the pymicrodose_release binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn fixture_config() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("pymicrodose")
        .join("release.toml")
}

fn release_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pymicrodose_release").expect("binary built");
    cmd.env_remove("PYMICRODOSE_RELEASE_CONFIG")
        .env_remove("PYMICRODOSE_RELEASE_PYTHON")
        .env_remove("PYMICRODOSE_RELEASE_UPLOADER");
    cmd
}

/// Project in a temp dir whose version lives in pyMicroDose/__version__.py
fn project_with_version_file(version_file: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("release.toml"),
        "[package]\nname = \"pymicrodose\"\ndescription = \"Microdosimetric models\"\n\n\
         [package.layout]\npackages = [\"pyMicroDose\"]\n",
    )
    .unwrap();
    std::fs::create_dir_all(dir.path().join("pyMicroDose")).unwrap();
    std::fs::write(dir.path().join("pyMicroDose").join("__version__.py"), version_file).unwrap();
    dir
}

#[test]
fn version_prints_configured_version() {
    release_cmd()
        .arg("--config")
        .arg(fixture_config())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::diff("1.1.2\n"));
}

#[test]
fn version_tag_prints_v_prefixed_tag() {
    release_cmd()
        .arg("--config")
        .arg(fixture_config())
        .args(["version", "--tag"])
        .assert()
        .success()
        .stdout(predicate::str::diff("v1.1.2\n"));
}

#[test]
fn version_falls_back_to_version_file() {
    let dir = project_with_version_file("__version__ = \"0.9.0\"\n");
    release_cmd()
        .arg("--config")
        .arg(dir.path().join("release.toml"))
        .args(["version", "--tag"])
        .assert()
        .success()
        .stdout(predicate::str::diff("v0.9.0\n"));
}

#[test]
fn missing_manifest_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    release_cmd()
        .arg("--config")
        .arg(dir.path().join("release.toml"))
        .arg("version")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Release manifest not found"));
}

#[test]
fn upload_without_version_attribute_touches_nothing() {
    let dir = project_with_version_file("__author__ = 'A. Bertolet'\n");
    let dist = dir.path().join("dist");
    std::fs::create_dir_all(&dist).unwrap();
    std::fs::write(dist.join("pymicrodose-1.0.0.tar.gz"), b"old").unwrap();

    release_cmd()
        .arg("--config")
        .arg(dir.path().join("release.toml"))
        .arg("upload")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not define '__version__'"));

    assert!(dist.join("pymicrodose-1.0.0.tar.gz").exists());
    assert!(!dir.path().join(".pymicrodose_release_state.json").exists());
}

#[test]
fn duplicate_version_attribute_is_rejected() {
    let dir = project_with_version_file("__version__ = '1.0'\n__version__ = '1.1'\n");
    release_cmd()
        .arg("--config")
        .arg(dir.path().join("release.toml"))
        .arg("version")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected exactly once"));
}

#[test]
fn clean_removes_dist_and_is_idempotent() {
    let dir = project_with_version_file("__version__ = '1.0.0'\n");
    let dist = dir.path().join("dist");
    std::fs::create_dir_all(&dist).unwrap();
    std::fs::write(dist.join("old.whl"), b"x").unwrap();

    for _ in 0..2 {
        release_cmd()
            .arg("--config")
            .arg(dir.path().join("release.toml"))
            .arg("clean")
            .assert()
            .success();
        assert!(!dist.exists());
    }
}

#[test]
fn dry_run_prints_commands_and_keeps_dist() {
    let dir = project_with_version_file("__version__ = '1.1.2'\n");
    let dist = dir.path().join("dist");
    std::fs::create_dir_all(&dist).unwrap();

    release_cmd()
        .arg("--config")
        .arg(dir.path().join("release.toml"))
        .args(["upload", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("setup.py sdist bdist_wheel --universal"))
        .stdout(predicate::str::contains("git tag v1.1.2"))
        .stdout(predicate::str::contains("git push --tags"));

    assert!(dist.exists());
}

#[test]
fn metadata_json_lists_declared_surface() {
    let output = release_cmd()
        .arg("--config")
        .arg(fixture_config())
        .args(["metadata", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "pymicrodose");
    assert_eq!(value["tag"], "v1.1.2");
    assert_eq!(value["extras_require"]["plots"][0], "matplotlib");
    assert_eq!(value["long_description_from_readme"], true);

    let files = value["package_data_files"]["pyMicroDose"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].as_str().unwrap().ends_with("water.csv"));
}

#[test]
fn status_without_history() {
    let dir = project_with_version_file("__version__ = '1.0.0'\n");
    release_cmd()
        .arg("--config")
        .arg(dir.path().join("release.toml"))
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No release recorded"));
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Write an executable shell script into `bin`
    fn script(bin: &Path, name: &str, body: &str) -> PathBuf {
        let path = bin.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    struct FakeTools {
        bin: PathBuf,
        log: PathBuf,
        python: PathBuf,
    }

    fn fake_tools(dir: &Path, build_body: &str) -> FakeTools {
        let bin = dir.join("fake-bin");
        std::fs::create_dir_all(&bin).unwrap();
        let log = dir.join("calls.log");
        let log_line = format!("echo \"$(basename \"$0\") $*\" >> '{}'", log.display());

        let python = script(&bin, "fake-python", &format!("{}\n{}", log_line, build_body));
        script(&bin, "twine", &log_line);
        script(&bin, "git", &log_line);

        FakeTools { bin, log, python }
    }

    fn run_with(tools: &FakeTools, config: &Path) -> assert_cmd::assert::Assert {
        let path = format!(
            "{}:{}",
            tools.bin.display(),
            std::env::var("PATH").unwrap_or_default()
        );
        release_cmd()
            .env("PATH", path)
            .env("PYMICRODOSE_RELEASE_PYTHON", &tools.python)
            .arg("--config")
            .arg(config)
            .arg("upload")
            .assert()
    }

    #[test]
    fn upload_runs_build_publish_tag_push() {
        let dir = project_with_version_file("__version__ = '1.1.2'\n");
        let tools = fake_tools(
            dir.path(),
            "mkdir -p dist && touch dist/pymicrodose-1.1.2.tar.gz dist/pymicrodose-1.1.2-py2.py3-none-any.whl",
        );

        run_with(&tools, &dir.path().join("release.toml"))
            .success()
            .stdout(predicate::str::contains("Released v1.1.2"));

        let log = std::fs::read_to_string(&tools.log).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 4, "unexpected calls: {log}");
        assert_eq!(lines[0], "fake-python setup.py sdist bdist_wheel --universal");
        assert!(lines[1].starts_with("twine upload "));
        assert!(lines[1].contains("pymicrodose-1.1.2.tar.gz"));
        assert!(lines[1].contains("pymicrodose-1.1.2-py2.py3-none-any.whl"));
        assert_eq!(lines[2], "git tag v1.1.2");
        assert_eq!(lines[3], "git push --tags");

        release_cmd()
            .arg("--config")
            .arg(dir.path().join("release.toml"))
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Tagged"));
    }

    #[test]
    fn no_push_hint_names_configured_remote() {
        let dir = project_with_version_file("__version__ = '1.1.2'\n");
        let config = dir.path().join("release.toml");
        let mut manifest = std::fs::read_to_string(&config).unwrap();
        manifest.push_str("\n[release]\nremote = \"upstream\"\n");
        std::fs::write(&config, manifest).unwrap();
        let tools = fake_tools(dir.path(), "mkdir -p dist && touch dist/pymicrodose-1.1.2.tar.gz");

        let path = format!(
            "{}:{}",
            tools.bin.display(),
            std::env::var("PATH").unwrap_or_default()
        );
        release_cmd()
            .env("PATH", path)
            .env("PYMICRODOSE_RELEASE_PYTHON", &tools.python)
            .arg("--config")
            .arg(&config)
            .args(["upload", "--no-push"])
            .assert()
            .success()
            .stdout(predicate::str::contains("run 'git push upstream --tags'"));

        let log = std::fs::read_to_string(&tools.log).unwrap();
        assert_eq!(log.lines().last(), Some("git tag v1.1.2"));
    }

    #[test]
    fn failing_build_stops_the_release() {
        let dir = project_with_version_file("__version__ = '1.1.2'\n");
        let tools = fake_tools(
            dir.path(),
            "echo \"error: invalid command 'bdist_wheel'\" >&2\nexit 1",
        );

        run_with(&tools, &dir.path().join("release.toml"))
            .code(1)
            .stderr(predicate::str::contains("build step failed"))
            .stderr(predicate::str::contains("invalid command 'bdist_wheel'"));

        let log = std::fs::read_to_string(&tools.log).unwrap();
        assert_eq!(log.lines().count(), 1, "only the build should run: {log}");

        let output = release_cmd()
            .arg("--config")
            .arg(dir.path().join("release.toml"))
            .args(["status", "--json"])
            .output()
            .unwrap();
        let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(state["current_phase"], "Failed");
        assert_eq!(state["failure"]["step"], "build");
    }
}

//! Process boundary for release steps.
//!
//! Every external tool invocation goes through [`CommandRunner`], so the
//! release sequence can be driven by real processes, printed as a dry run,
//! or replayed against an instrumented stand-in.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};

/// A single external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    /// Executable name or path
    pub program: String,
    /// Arguments, passed verbatim (no shell expansion)
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
}

impl StepCommand {
    /// Create a command running in `cwd`
    pub fn new<I, S>(program: impl Into<String>, args: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
        }
    }

    /// Command line as shown to the user
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of a finished process
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code; `None` when terminated by a signal
    pub code: Option<i32>,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Successful (zero) exit
    pub fn success() -> Self {
        Self {
            code: Some(0),
            stderr: String::new(),
        }
    }

    /// Nonzero exit with the given stderr
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stderr: stderr.into(),
        }
    }

    /// Whether the process exited with status zero
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands for the release steps
pub trait CommandRunner {
    /// Run a command to completion.
    ///
    /// An `Err` means the process could not be started; a process that ran
    /// and failed is reported through [`CommandOutput::code`].
    fn run(&self, command: &StepCommand) -> impl Future<Output = std::io::Result<CommandOutput>>;

    /// Whether `program` can be found before anything is run
    fn is_available(&self, _program: &str) -> bool {
        true
    }
}

/// Runs commands as real child processes.
///
/// Standard output is inherited so build and upload progress stays visible;
/// standard error is echoed line by line and also captured for error reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, command: &StepCommand) -> std::io::Result<CommandOutput> {
        log::debug!(
            "Spawning '{}' in {}",
            command.display(),
            command.cwd.display()
        );

        let mut child = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()?;

        // Stderr is not guaranteed to be UTF-8. The child is always awaited.
        let mut captured = String::new();
        if let Some(stderr) = child.stderr.take() {
            let mut reader = BufReader::new(stderr);
            let mut line = Vec::new();
            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let text = String::from_utf8_lossy(&line);
                        let text = text.trim_end_matches(['\n', '\r']);
                        eprintln!("{}", text);
                        captured.push_str(text);
                        captured.push('\n');
                    }
                    Err(e) => {
                        log::warn!("Stopped reading stderr of '{}': {}", command.display(), e);
                        break;
                    }
                }
            }
        }

        let status = child.wait().await?;
        log::debug!("'{}' exited with {:?}", command.display(), status.code());

        Ok(CommandOutput {
            code: status.code(),
            stderr: captured,
        })
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Prints commands instead of running them
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    async fn run(&self, command: &StepCommand) -> std::io::Result<CommandOutput> {
        log::info!("[dry run] {}", command.display());
        Ok(CommandOutput::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let cmd = StepCommand::new("git", ["push", "origin", "--tags"], "/repo");
        assert_eq!(cmd.display(), "git push origin --tags");
        assert_eq!(cmd.cwd, PathBuf::from("/repo"));
    }

    #[test]
    fn only_zero_exit_is_success() {
        assert!(CommandOutput::success().is_success());
        assert!(!CommandOutput::failure(1, "boom").is_success());
        assert!(!CommandOutput::default().is_success());
    }

    #[tokio::test]
    async fn dry_run_always_succeeds() {
        let cmd = StepCommand::new("definitely-not-installed", ["x"], ".");
        let output = DryRunRunner.run(&cmd).await.unwrap();
        assert!(output.is_success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_captures_stderr_and_exit_code() {
        let cmd = StepCommand::new("sh", ["-c", "echo oops >&2; exit 3"], ".");
        let output = SystemRunner.run(&cmd).await.unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_tolerates_non_utf8_stderr() {
        let cmd = StepCommand::new(
            "sh",
            ["-c", "printf 'caf\\351 warning\\n' >&2; echo done >&2; exit 0"],
            ".",
        );
        let output = SystemRunner.run(&cmd).await.unwrap();
        assert!(output.is_success());
        assert!(output.stderr.starts_with("caf\u{FFFD} warning\n"));
        assert!(output.stderr.ends_with("done\n"));
    }

    #[tokio::test]
    async fn system_runner_reports_spawn_failure() {
        let cmd = StepCommand::new("pymicrodose-release-no-such-binary", Vec::<String>::new(), ".");
        assert!(SystemRunner.run(&cmd).await.is_err());
        assert!(!SystemRunner.is_available("pymicrodose-release-no-such-binary"));
    }
}

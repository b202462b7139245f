//! Colored terminal output for the release steps.
//!
//! Every status line is a colored glyph followed by the message. Quiet mode
//! suppresses everything except errors.

use std::io::Write;
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    stdout: BufferWriter,
    verbose: bool,
    quiet: bool,
}

/// Write `glyph` in `glyph_spec`, then the message in `text_spec`
fn glyph_line(
    buffer: &mut Buffer,
    glyph: &str,
    glyph_spec: &ColorSpec,
    text_spec: Option<&ColorSpec>,
    message: &str,
) -> std::io::Result<()> {
    buffer.set_color(glyph_spec)?;
    write!(buffer, "{}", glyph)?;
    buffer.reset()?;
    if let Some(spec) = text_spec {
        buffer.set_color(spec)?;
    }
    writeln!(buffer, " {}", message)?;
    buffer.reset()
}

fn fg(color: Color) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color));
    spec
}

fn bold_fg(color: Color) -> ColorSpec {
    let mut spec = fg(color);
    spec.set_bold(true);
    spec
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            stdout: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    fn status(
        &self,
        glyph: &str,
        glyph_spec: ColorSpec,
        text_spec: Option<ColorSpec>,
        message: &str,
    ) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        glyph_line(&mut buffer, glyph, &glyph_spec, text_spec.as_ref(), message)?;
        self.stdout.print(&buffer)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.status("✓", bold_fg(Color::Green), None, message)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.status("⚠", bold_fg(Color::Yellow), Some(fg(Color::Yellow)), message)
    }

    /// Print an error message to stderr (shown even when quiet)
    pub fn error(&self, message: &str) {
        let stderr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = stderr.buffer();
        let written = glyph_line(
            &mut buffer,
            "✗",
            &bold_fg(Color::Red),
            Some(&fg(Color::Red)),
            message,
        )
        .and_then(|()| stderr.print(&buffer));
        if written.is_err() {
            eprintln!("✗ {}", message);
        }
    }

    /// Print a message only in verbose mode
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.status("→", fg(Color::Blue), None, message)
    }

    /// Print a command about to run
    pub fn command(&self, command_line: &str) -> std::io::Result<()> {
        self.status("$", fg(Color::Magenta), None, command_line)
    }

    /// Print a step header in bold
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        buffer.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(buffer, "{}", title)?;
        buffer.reset()?;
        self.stdout.print(&buffer)
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.println(&format!("    {}", message))
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        writeln!(buffer, "{}", message)?;
        self.stdout.print(&buffer)
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_line_writes_glyph_then_message() {
        let mut buffer = Buffer::no_color();
        glyph_line(&mut buffer, "✓", &bold_fg(Color::Green), None, "Released v1.1.2").unwrap();
        assert_eq!(String::from_utf8_lossy(buffer.as_slice()), "✓ Released v1.1.2\n");
    }

    #[test]
    fn quiet_suppresses_status_lines() {
        let output = OutputManager::new(true, true);
        assert!(output.is_quiet());
        assert!(output.success("ok").is_ok());
        assert!(output.verbose("detail").is_ok());
    }
}

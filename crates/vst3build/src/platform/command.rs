//! Toolchain command description and execution
//!
//! Commands are built as plain data first so the exact invocation can be
//! inspected (and printed for `--dry-run`) before anything is spawned.

use camino::{Utf8Path, Utf8PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// A single toolchain invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    /// Short description of the step, e.g. "Build shared code"
    pub step: String,
    /// Program looked up on PATH
    pub program: String,
    /// Arguments, passed verbatim
    pub args: Vec<String>,
    /// Working directory
    pub cwd: Utf8PathBuf,
}

impl BuildCommand {
    pub fn new(step: impl Into<String>, program: impl Into<String>, cwd: &Utf8Path) -> Self {
        Self {
            step: step.into(),
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Command line as it would be typed in a shell
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.contains(' ') {
                    format!("\"{}\"", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Run a command to completion with inherited stdio.
///
/// A spawn failure or a non-zero exit status is a [`Error::BuildCommandFailed`].
pub fn run_command(command: &BuildCommand) -> Result<()> {
    tracing::info!("{}", command.step);
    tracing::debug!(cwd = %command.cwd, "Running command: {}", command.display());

    let status = Command::new(&command.program)
        .args(&command.args)
        .current_dir(&command.cwd)
        .status()
        .map_err(|e| {
            Error::build_command(
                format!("{} failed to start `{}`", command.step, command.program),
                e.to_string(),
            )
        })?;

    if !status.success() {
        return Err(Error::build_command(
            format!("{} failed ({}): {}", command.step, status, command.display()),
            "Check the toolchain output above for errors",
        ));
    }

    Ok(())
}

/// Check that `tool` is discoverable on PATH
pub fn require_tool(tool: &str, help: &str) -> Result<Utf8PathBuf> {
    let path = which::which(tool).map_err(|_| Error::toolchain_not_found(tool, help))?;
    tracing::debug!("Found {} at {}", tool, path.display());

    Utf8PathBuf::from_path_buf(path).map_err(|p| {
        Error::toolchain_not_found(
            tool,
            format!("{} was found at a non UTF-8 path: {}", tool, p.display()),
        )
    })
}

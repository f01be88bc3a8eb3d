//! Running package manager commands
//!
//! The lifecycle engine only needs one capability from the outside world:
//! run an argv to completion and report what happened. [`CommandRunner`]
//! is that seam; [`SystemRunner`] is the real implementation.

use std::process::Command;

use tracing::debug;

use crate::error::{ImsError, ImsResult};

/// Outcome of a command that was launched
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Turn a non-zero exit into [`ImsError::CommandFailed`]
    pub fn into_result(self, argv: &[String]) -> ImsResult<CommandOutput> {
        if self.success {
            Ok(self)
        } else {
            Err(ImsError::CommandFailed {
                command: argv.join(" "),
                status: self.status,
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs an argv synchronously, capturing its output
pub trait CommandRunner {
    /// Run `argv` and wait for it to exit
    ///
    /// Errors only when the process could not be launched; a non-zero exit
    /// is reported through [`CommandOutput::success`].
    fn run(&self, argv: &[String]) -> ImsResult<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, argv: &[String]) -> ImsResult<CommandOutput> {
        (**self).run(argv)
    }
}

/// Runs commands with [`std::process::Command`]
///
/// Blocks until the child exits; there is no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> ImsResult<CommandOutput> {
        let (program, args) = argv.split_first().ok_or_else(|| ImsError::CommandLaunch {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

        debug!(program = %program, ?args, "Running command");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ImsError::CommandLaunch {
                program: program.clone(),
                source,
            })?;

        debug!(status = ?output.status.code(), "Command finished");

        Ok(CommandOutput {
            status: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

//! External command execution.
//!
//! The native toolchain (autoreconf, configure, make) is an opaque
//! dependency: the builder only hands it arguments and inspects the exit
//! status. [`CommandRunner`] is the injection seam that keeps pipeline
//! sequencing testable without invoking a real toolchain.

use std::io;
use std::path::Path;
use std::process::Command;

/// Outcome of one external command invocation.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code of the process. `-1` when terminated by a signal.
    pub code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl RunOutput {
    /// Whether the command exited with code zero.
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Capability to run an external command in a working directory.
///
/// Implementations block until the process completes and report its exit
/// status verbatim; they never retry. An `Err` means the process could
/// not be started at all.
pub trait CommandRunner {
    /// Runs `program` with `args` in `cwd`, waiting for completion.
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<RunOutput>;
}

/// [`CommandRunner`] backed by [`std::process::Command`].
///
/// Captures stdout and stderr so failures can be reported with the
/// tool's own output attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<RunOutput> {
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(RunOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_process_runner_missing_program() {
        let runner = ProcessRunner;
        let result = runner.run("nonexistent-command-12345", &[], &PathBuf::from("."));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_captures_exit_code() {
        let runner = ProcessRunner;
        let output = runner
            .run("false", &[], &PathBuf::from("."))
            .expect("false should spawn");
        assert!(!output.success());
        assert_eq!(output.code, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_success() {
        let runner = ProcessRunner;
        let output = runner
            .run("true", &[], &PathBuf::from("."))
            .expect("true should spawn");
        assert!(output.success());
    }
}

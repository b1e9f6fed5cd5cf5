//! External process execution
//!
//! Every strategy talks to its backend tool through the [`Runner`] seam; the
//! production [`SystemRunner`] wraps `std::process::Command`, and tests
//! substitute a recording double. A nonzero exit status is always a fatal,
//! non-retried failure.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::RunError;
use crate::output;

/// RAII guard for spinners - ensures cleanup on any exit path
struct SpinnerGuard(indicatif::ProgressBar);

impl Drop for SpinnerGuard {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}

/// Process-execution capability consumed by every strategy.
pub trait Runner {
    /// Run a command to completion with its output visible.
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), RunError>;

    /// Run a command with output suppressed unless verbose mode is active.
    ///
    /// Captured stderr is folded into the error on failure.
    fn run_quiet(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), RunError>;

    /// Whether `program` resolves to an executable on PATH.
    fn has_tool(&self, program: &str) -> bool;
}

/// Runs commands on the host system.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    verbose: bool,
}

impl SystemRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Runner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), RunError> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let status = cmd.status().map_err(|e| RunError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(RunError::Exit {
                program: program.to_string(),
                code: status.code(),
            })
        }
    }

    fn run_quiet(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), RunError> {
        if self.verbose {
            return self.run(program, args, cwd);
        }

        let _guard = SpinnerGuard(output::spinner(&format!("{} {}", program, args.join(" "))));

        let mut cmd = Command::new(program);
        cmd.args(args).stdout(Stdio::null()).stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let out = cmd.output().map_err(|e| RunError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

        if out.status.success() {
            Ok(())
        } else {
            Err(RunError::ExitWithStderr {
                program: program.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            })
        }
    }

    fn has_tool(&self, program: &str) -> bool {
        let Some(paths) = std::env::var_os("PATH") else {
            return false;
        };
        std::env::split_paths(&paths).any(|dir| dir.join(program).is_file())
    }
}

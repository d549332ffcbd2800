//! Execution engine: runs an already-approved operation as a child process,
//! or as an in-process working-directory mutation for `cd`.
//!
//! The engine performs no safety re-check — callers gate operations through
//! [`policy::SafetyPolicy`] first.

pub mod policy;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use voxsh_intent::{Operation, Platform};

/// Exit code reported for faults that never reached process invocation
/// (spawn failure, timeout).
pub const EXIT_FAULT: i32 = -1;

/// Outcome of running one operation.  Failure is data here, not an error:
/// the engine never propagates a fault to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// The literal command line handed to the interpreter, kept for
    /// diagnostics.
    pub command_line: String,
    pub exit_code: i32,
}

impl ExecResult {
    fn fault(command_line: String, error: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: error,
            command_line,
            exit_code: EXIT_FAULT,
        }
    }
}

/// One shell session: owns the working directory the spec's original
/// design kept as process-global state.  `execute` takes `&mut self`, so
/// directory mutation and subsequent relative-path commands are serialized
/// by construction; independent sessions can coexist.
pub struct ShellSession {
    platform: Platform,
    cwd: PathBuf,
    timeout: Duration,
    max_output: usize,
}

impl ShellSession {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            timeout: Duration::from_secs(30),
            max_output: 5_000,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = max_output;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Run an approved operation to completion.
    pub async fn execute(&mut self, op: &Operation) -> ExecResult {
        // `cd` mutates session state instead of spawning: a child process
        // changing its own directory would not affect this session.
        if op.base_token().eq_ignore_ascii_case("cd") {
            return self.change_directory(op);
        }

        let command_line = op.command_line();
        info!(command = %command_line, cwd = %self.cwd.display(), "executing");

        let (shell, flag) = match self.platform {
            Platform::Windows => ("cmd", "/C"),
            Platform::Posix => ("sh", "-c"),
        };

        let mut cmd = tokio::process::Command::new(shell);
        cmd.arg(flag).arg(&command_line).current_dir(&self.cwd);
        // A timed-out command must not linger as a detached child.
        cmd.kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_) => {
                error!(command = %command_line, "command timed out");
                return ExecResult::fault(
                    command_line,
                    format!("command timed out after {}s", self.timeout.as_secs()),
                );
            }
            Ok(Err(err)) => {
                error!(command = %command_line, %err, "failed to spawn command");
                return ExecResult::fault(command_line, err.to_string());
            }
            Ok(Ok(output)) => output,
        };

        let stdout = self.truncate(self.decode(&output.stdout).trim().to_string());
        let stderr = self.truncate(self.decode(&output.stderr).trim().to_string());
        let exit_code = output.status.code().unwrap_or(EXIT_FAULT);

        if output.status.success() {
            ExecResult {
                success: true,
                stdout,
                stderr: String::new(),
                command_line,
                exit_code,
            }
        } else {
            // Commands may write diagnostics to stdout even on failure, so
            // both streams are kept.
            ExecResult {
                success: false,
                stdout,
                stderr,
                command_line,
                exit_code,
            }
        }
    }

    /// UTF-8 first; on Windows retry with the legacy console code page;
    /// lossy as the last resort.
    fn decode(&self, bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) if self.platform == Platform::Windows => {
                let (text, _, _) = encoding_rs::BIG5.decode(bytes);
                text.into_owned()
            }
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Deterministic truncation on a char boundary, surfaced in the result.
    fn truncate(&self, text: String) -> String {
        if text.len() <= self.max_output {
            return text;
        }
        let mut end = self.max_output;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…[truncated]", &text[..end])
    }

    fn change_directory(&mut self, op: &Operation) -> ExecResult {
        let command_line = op.command_line();

        let Some(target) = op.args.first() else {
            // Bare `cd` reports the current directory without mutating it.
            return ExecResult {
                success: true,
                stdout: self.cwd.display().to_string(),
                stderr: String::new(),
                command_line,
                exit_code: 0,
            };
        };

        let resolved = if Path::new(target).is_absolute() {
            PathBuf::from(target)
        } else {
            self.cwd.join(target)
        };

        if !resolved.is_dir() {
            return ExecResult {
                success: false,
                stdout: String::new(),
                stderr: format!("directory not found: {target}"),
                command_line,
                exit_code: 1,
            };
        }

        match resolved.canonicalize() {
            Ok(canonical) => {
                info!(from = %self.cwd.display(), to = %canonical.display(), "directory changed");
                self.cwd = canonical;
                ExecResult {
                    success: true,
                    stdout: self.cwd.display().to_string(),
                    stderr: String::new(),
                    command_line,
                    exit_code: 0,
                }
            }
            Err(err) => ExecResult {
                success: false,
                stdout: String::new(),
                stderr: format!("failed to change directory: {err}"),
                command_line,
                exit_code: 1,
            },
        }
    }
}

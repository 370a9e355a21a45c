//! # Shell Command Execution
//!
//! Runs OS commands through `sh -c` and captures their output. Bytes are
//! decoded as UTF-8, invalid sequences are replaced.
//!
//! No timeout is applied: a command that never exits blocks the caller.

use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::error::{HarnessError, Result};

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `-1` when the process was terminated by a signal.
    pub exit_code: i32,
}

impl CommandOutput {
    fn from_output(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout when the command printed anything there, stderr otherwise.
    pub fn printed(&self) -> &str {
        if self.stdout.is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

/// Runs `command` through the shell and waits for it.
pub fn run(command: &str) -> Result<CommandOutput> {
    debug!(command, "running shell command");
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| HarnessError::Shell {
            command: command.to_string(),
            source,
        })?;

    let output = CommandOutput::from_output(output);
    debug!(command, exit_code = output.exit_code, "shell command finished");
    Ok(output)
}

/// Runs `command` and returns whatever it printed.
pub fn run_print(command: &str) -> Result<String> {
    run(command).map(|output| output.printed().to_string())
}

/// Runs `program` directly with `args`, bypassing the shell.
pub fn run_program(program: &str, args: &[&str]) -> Result<CommandOutput> {
    debug!(program, ?args, "running program");
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| HarnessError::Shell {
            command: format!("{program} {}", args.join(" ")),
            source,
        })?;

    Ok(CommandOutput::from_output(output))
}

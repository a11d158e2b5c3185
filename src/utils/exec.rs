use crate::config::HelperConfig;
use crate::error::HelperError;
use crate::utils::string::bytes_to_string;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Local command execution helpers
pub mod local {
    use super::*;

    pub fn execute(program: impl AsRef<Path>, args: &[&str]) -> Result<Output> {
        let program = program.as_ref();
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.stdout(Stdio::piped()); // Capture stdout for parsing
        cmd.stderr(Stdio::piped()); // Capture stderr for error messages
        cmd.stdin(Stdio::null());
        cmd.output()
            .with_context(|| format!("Failed to execute command: {}", program.display()))
    }

    /// Check if a command exists using native Rust (which crate)
    pub fn check_command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }
}

/// Trait for running the external tools a hook talks to
pub trait CommandExecutor {
    /// Run a program and capture its output; a non-zero exit is not an error here
    fn execute_simple(&self, program: &str, args: &[&str]) -> Result<Output>;

    /// Check if a command exists
    fn check_command_exists(&self, command: &str) -> Result<bool>;
}

/// Executor for hook tools on the local machine
///
/// Juju puts its hook tools (`relation-get`, `open-port`, ...) on the `PATH`
/// of a running hook. When `tools_dir` is set, programs found there take
/// precedence over the `PATH` lookup.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    tools_dir: Option<PathBuf>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tools_dir(tools_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools_dir: Some(tools_dir.into()),
        }
    }

    pub fn from_config(config: &HelperConfig) -> Self {
        Self {
            tools_dir: config.tools_dir.clone(),
        }
    }

    /// Path the program will be spawned from
    pub fn resolve_program(&self, program: &str) -> PathBuf {
        if let Some(dir) = &self.tools_dir {
            let candidate = dir.join(program);
            if candidate.is_file() {
                return candidate;
            }
        }
        PathBuf::from(program)
    }
}

impl CommandExecutor for Executor {
    fn execute_simple(&self, program: &str, args: &[&str]) -> Result<Output> {
        if !self.check_command_exists(program)? {
            anyhow::bail!(
                "hook tool '{}' not found (not running inside a Juju hook?)",
                program
            );
        }
        let resolved = self.resolve_program(program);
        debug!(command = %command_line(program, args), path = %resolved.display(), "executing");
        local::execute(&resolved, args)
    }

    fn check_command_exists(&self, command: &str) -> Result<bool> {
        if self.resolve_program(command).is_absolute() {
            return Ok(true);
        }
        Ok(local::check_command_exists(command))
    }
}

/// Render a program and its arguments as one line for messages
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command, failing with `HelperError::CommandFailed` on a non-zero exit
pub fn check_call<E: CommandExecutor>(exec: &E, program: &str, args: &[&str]) -> Result<()> {
    let output = exec.execute_simple(program, args)?;
    ensure_success(program, args, &output)
}

/// Run a command and return its trimmed stdout, failing on a non-zero exit
pub fn check_output<E: CommandExecutor>(exec: &E, program: &str, args: &[&str]) -> Result<String> {
    let output = exec.execute_simple(program, args)?;
    ensure_success(program, args, &output)?;
    Ok(bytes_to_string(&output.stdout))
}

fn ensure_success(program: &str, args: &[&str], output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(HelperError::CommandFailed {
        command: command_line(program, args),
        code: output.status.code(),
        stderr: bytes_to_string(&output.stderr),
    }
    .into())
}

//! Scripted stand-in for the hook tools, for unit tests

use crate::utils::exec::{CommandExecutor, command_line};
use anyhow::Result;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Output};

struct Reply {
    code: i32,
    stdout: String,
    stderr: String,
}

/// Replies to exact command lines with canned output and records every call.
/// Command lines without a scripted reply succeed with empty output.
#[derive(Default)]
pub struct ScriptedExecutor {
    replies: HashMap<String, Reply>,
    unavailable: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed with `stdout`
    pub fn reply(mut self, line: &str, stdout: &str) -> Self {
        self.replies.insert(
            line.to_string(),
            Reply {
                code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
        self
    }

    /// Exit with `code` and `stdout`
    pub fn exit(mut self, line: &str, code: i32, stdout: &str) -> Self {
        self.replies.insert(
            line.to_string(),
            Reply {
                code,
                stdout: stdout.to_string(),
                stderr: format!("exit {}", code),
            },
        );
        self
    }

    /// Treat `program` as not installed
    pub fn unavailable(mut self, program: &str) -> Self {
        self.unavailable.insert(program.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn execute_simple(&self, program: &str, args: &[&str]) -> Result<Output> {
        let line = command_line(program, args);
        self.calls.borrow_mut().push(line.clone());

        if !self.check_command_exists(program)? {
            anyhow::bail!(
                "hook tool '{}' not found (not running inside a Juju hook?)",
                program
            );
        }

        let (code, stdout, stderr) = match self.replies.get(&line) {
            Some(reply) => (reply.code, reply.stdout.clone(), reply.stderr.clone()),
            None => (0, String::new(), String::new()),
        };
        Ok(Output {
            status: ExitStatus::from_raw(code << 8),
            stdout: stdout.into_bytes(),
            stderr: stderr.into_bytes(),
        })
    }

    fn check_command_exists(&self, command: &str) -> Result<bool> {
        Ok(!self.unavailable.contains(command))
    }
}

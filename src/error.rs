use thiserror::Error;

/// Failures callers may need to tell apart from other errors.
///
/// These travel inside `anyhow::Error`; use `downcast_ref::<HelperError>()`
/// to recover them.
#[derive(Debug, Error)]
pub enum HelperError {
    /// A tool ran but exited non-zero (or was killed by a signal)
    #[error("Command '{command}' failed with exit code: {}{}", format_code(.code), format_stderr(.stderr))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{0}")]
    UnsupportedRelease(String),
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

fn format_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr)
    }
}

impl HelperError {
    /// True if this error (or anything in its chain) is a non-zero exit
    pub fn is_command_failure(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<HelperError>(),
                Some(HelperError::CommandFailed { .. })
            )
        })
    }
}

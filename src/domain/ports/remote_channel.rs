//! Remote Channel Port
//!
//! The secured remote-execution channel: copy content to an absolute
//! remote path, or run one shell command line. Both operations are
//! synchronous and all-or-nothing per invocation; the channel does not
//! retry on its own.

use thiserror::Error;

use crate::domain::value_objects::RemotePath;

/// Error from the remote channel
#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    /// Could not reach or authenticate to the host
    #[error("connection to {host} failed: {message}")]
    Connection { host: String, message: String },

    /// A command ran and exited non-zero
    #[error("remote command exited with status {exit_code}: {stderr}")]
    CommandFailed { exit_code: i32, stderr: String },

    /// Copying content to a remote path failed
    #[error("failed to copy to {remote_path}: {message}")]
    CopyFailed {
        remote_path: String,
        message: String,
    },
}

/// Captured output of one remote command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a non-zero exit into an error carrying stderr and the code
    pub fn check(self) -> Result<CommandOutput, RemoteError> {
        if self.success() {
            Ok(self)
        } else {
            Err(RemoteError::CommandFailed {
                exit_code: self.exit_code,
                stderr: self.stderr.trim_end().to_string(),
            })
        }
    }
}

/// Trait for the remote execution channel
pub trait RemoteChannel: Send + Sync {
    /// Host this channel talks to, for display
    fn host(&self) -> &str;

    /// Place content at an absolute remote path, creating parents as needed
    fn copy(&self, remote_path: &RemotePath, content: &[u8]) -> Result<(), RemoteError>;

    /// Run one shell command line, capturing stdout, stderr, and exit status
    ///
    /// A non-zero exit is returned as a normal `CommandOutput`; callers
    /// that require success go through [`CommandOutput::check`].
    fn run(&self, command_line: &str) -> Result<CommandOutput, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_passes_through_success() {
        let output = CommandOutput {
            stdout: "ok".to_string(),
            stderr: String::new(),
            exit_code: 0,
        };
        assert_eq!(output.check().unwrap().stdout, "ok");
    }

    #[test]
    fn check_surfaces_exit_code_and_stderr() {
        let output = CommandOutput {
            stdout: String::new(),
            stderr: "no such file\n".to_string(),
            exit_code: 2,
        };
        let err = output.check().unwrap_err();
        assert_eq!(
            err.to_string(),
            "remote command exited with status 2: no such file"
        );
    }
}

//! OpenSSH-backed remote channel
//!
//! Drives the system `ssh` binary as a subprocess. Commands run via
//! `ssh <dest> <line>`; uploads stream content over stdin into
//! `mkdir -p <parent> && cat > <path>` so rendered secrets never appear in
//! a process argument list on either side.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::config::ConnectionConfig;
use crate::domain::ports::{CommandOutput, RemoteChannel, RemoteError};
use crate::domain::value_objects::{shell_quote, RemotePath};

/// Remote channel over the system OpenSSH client
pub struct SshChannel {
    host: String,
    user: String,
    private_key: Option<PathBuf>,
}

impl SshChannel {
    pub fn new(connection: &ConnectionConfig) -> Self {
        Self {
            host: connection.host.clone(),
            user: connection.user.clone(),
            private_key: connection.private_key.clone(),
        }
    }

    /// `user@host` destination handed to ssh
    fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Base ssh invocation with key and non-interactive auth
    fn ssh_command(&self) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o").arg("BatchMode=yes");
        if let Some(key) = &self.private_key {
            cmd.arg("-i").arg(key);
        }
        cmd.arg(self.destination());
        cmd
    }

    fn connection_error(&self, err: std::io::Error) -> RemoteError {
        RemoteError::Connection {
            host: self.host.clone(),
            message: err.to_string(),
        }
    }
}

impl RemoteChannel for SshChannel {
    fn host(&self) -> &str {
        &self.host
    }

    fn run(&self, command_line: &str) -> Result<CommandOutput, RemoteError> {
        let output = self
            .ssh_command()
            .arg(command_line)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.connection_error(e))?;

        // ssh reports its own connection failures as exit code 255.
        if output.status.code() == Some(255) {
            return Err(RemoteError::Connection {
                host: self.host.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    fn copy(&self, remote_path: &RemotePath, content: &[u8]) -> Result<(), RemoteError> {
        let line = format!(
            "mkdir -p {} && cat > {}",
            shell_quote(remote_path.parent()),
            shell_quote(remote_path.as_str())
        );

        let mut child = self
            .ssh_command()
            .arg(&line)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.connection_error(e))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(content)
                .map_err(|e| RemoteError::CopyFailed {
                    remote_path: remote_path.as_str().to_string(),
                    message: e.to_string(),
                })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| self.connection_error(e))?;

        if !output.status.success() {
            return Err(RemoteError::CopyFailed {
                remote_path: remote_path.as_str().to_string(),
                message: format!(
                    "exit status {}: {}",
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(())
    }
}

//! Common test utilities for Hostsmith integration tests.
//!
//! Provides:
//! - `MemoryChannel`: in-memory remote channel recording every operation
//! - `CollectingSink`: event sink capturing events for assertions
//! - `Project`: temp-directory fixture with assets and configuration

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hostsmith::domain::ports::{ApplyEvent, CommandOutput, EventSink, RemoteChannel, RemoteError};
use hostsmith::domain::value_objects::RemotePath;
use tempfile::TempDir;

/// One recorded remote operation, in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Copy(String),
    Run(String),
}

/// In-memory remote channel
///
/// Records every copy and run in order, stores uploaded content, and can
/// be told to fail specific copies or answer specific commands.
#[derive(Default)]
pub struct MemoryChannel {
    /// Uploaded content by remote path
    pub files: Mutex<BTreeMap<String, Vec<u8>>>,
    /// Every operation in execution order
    pub log: Mutex<Vec<Op>>,
    /// Canned responses by exact command line
    pub responses: Mutex<HashMap<String, CommandOutput>>,
    /// Remote paths whose copy should fail
    pub fail_copies: Mutex<Vec<String>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, command_line: &str, output: CommandOutput) {
        self.responses
            .lock()
            .unwrap()
            .insert(command_line.to_string(), output);
    }

    pub fn fail_copy_to(&self, remote_path: &str) {
        self.fail_copies
            .lock()
            .unwrap()
            .push(remote_path.to_string());
    }

    pub fn ops(&self) -> Vec<Op> {
        self.log.lock().unwrap().clone()
    }

    pub fn copies(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Copy(path) => Some(path),
                Op::Run(_) => None,
            })
            .collect()
    }

    pub fn runs(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Run(line) => Some(line),
                Op::Copy(_) => None,
            })
            .collect()
    }

    pub fn file(&self, remote_path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(remote_path).cloned()
    }
}

impl RemoteChannel for MemoryChannel {
    fn host(&self) -> &str {
        "test-host"
    }

    fn copy(&self, remote_path: &RemotePath, content: &[u8]) -> Result<(), RemoteError> {
        let path = remote_path.as_str().to_string();
        if self.fail_copies.lock().unwrap().contains(&path) {
            return Err(RemoteError::CopyFailed {
                remote_path: path,
                message: "injected copy failure".to_string(),
            });
        }
        self.log.lock().unwrap().push(Op::Copy(path.clone()));
        self.files.lock().unwrap().insert(path, content.to_vec());
        Ok(())
    }

    fn run(&self, command_line: &str) -> Result<CommandOutput, RemoteError> {
        self.log
            .lock()
            .unwrap()
            .push(Op::Run(command_line.to_string()));
        let canned = self.responses.lock().unwrap().get(command_line).cloned();
        Ok(canned.unwrap_or_default())
    }
}

/// Event sink that collects events for assertions
#[derive(Default)]
pub struct CollectingSink {
    pub events: Mutex<Vec<ApplyEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<ApplyEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Debug rendering of every event, for leak checks
    pub fn rendered(&self) -> String {
        self.all()
            .iter()
            .map(|e| format!("{:?}", e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl EventSink for CollectingSink {
    fn on_event(&self, event: ApplyEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Temp-directory project fixture
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp project"),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a file under the project, creating parents
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `hostsmith.toml` with the given body appended to a connection
    pub fn write_config(&self, extra: &str) -> PathBuf {
        let toml = format!(
            "[connection]\nhost = \"pve.test\"\nuser = \"root\"\n\n{}",
            extra
        );
        self.write("hostsmith.toml", &toml)
    }

    pub fn state_path(&self) -> PathBuf {
        self.path("hostsmith.lock")
    }
}

/// Run the hostsmith binary in a directory
pub fn run_cli(cwd: &Path, args: &[&str]) -> (bool, String, String) {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_hostsmith"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("failed to execute hostsmith");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

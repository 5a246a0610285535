//! StateFile entity - tracks applied step fingerprints and file hashes
//!
//! The state file is how re-applying stays idempotent: a step whose
//! recorded fingerprint matches its computed one is skipped, and a file
//! whose recorded hash matches its rendered hash is not re-uploaded.
//! Pure data structure; I/O lives in the state repository.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ContentHash;

/// Current state file format version
pub const STATE_VERSION: u32 = 1;

fn default_version() -> u32 {
    STATE_VERSION
}

/// Recorded outcome of previous applies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default = "default_version")]
    pub version: u32,

    /// When this state was last written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,

    /// Remote path to content hash of the last uploaded artifact
    #[serde(default)]
    files: BTreeMap<String, String>,

    /// Step name to fingerprint of the last successful application
    #[serde(default)]
    steps: BTreeMap<String, String>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            generated_at: None,
            files: BTreeMap::new(),
            steps: BTreeMap::new(),
        }
    }
}

impl StateFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded hash for a remote path, if any
    pub fn file_hash(&self, remote_path: &str) -> Option<&str> {
        self.files.get(remote_path).map(String::as_str)
    }

    /// Whether the recorded hash for a remote path matches
    pub fn file_matches(&self, remote_path: &str, hash: &ContentHash) -> bool {
        self.file_hash(remote_path)
            .map(|recorded| hash.matches_str(recorded))
            .unwrap_or(false)
    }

    pub fn set_file_hash(&mut self, remote_path: &str, hash: &ContentHash) {
        self.files
            .insert(remote_path.to_string(), hash.as_str().to_string());
    }

    /// Recorded fingerprint for a step, if any
    pub fn step_fingerprint(&self, step: &str) -> Option<&str> {
        self.steps.get(step).map(String::as_str)
    }

    /// Whether the recorded fingerprint for a step matches
    pub fn step_matches(&self, step: &str, fingerprint: &ContentHash) -> bool {
        self.step_fingerprint(step)
            .map(|recorded| fingerprint.matches_str(recorded))
            .unwrap_or(false)
    }

    pub fn set_step_fingerprint(&mut self, step: &str, fingerprint: &ContentHash) {
        self.steps
            .insert(step.to_string(), fingerprint.as_str().to_string());
    }

    pub fn tracked_file_count(&self) -> usize {
        self.files.len()
    }

    pub fn tracked_step_count(&self) -> usize {
        self.steps.len()
    }

    /// Stamp the generation time before persisting
    pub fn touch(&mut self) {
        self.generated_at = Some(Utc::now());
    }
}

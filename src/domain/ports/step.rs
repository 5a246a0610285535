//! Provision Step Port
//!
//! The interface every node in the task graph implements: a local-only
//! plan (what would change) and an apply against the remote channel.

use std::collections::BTreeMap;

use crate::domain::entities::StateFile;
use crate::domain::ports::events::EventSink;
use crate::domain::ports::remote_channel::RemoteChannel;
use crate::domain::value_objects::SecretString;
use crate::error::HostsmithResult;

/// What applying a step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step executed remote operations
    Applied,
    /// Recorded state already matched; nothing ran
    Unchanged,
}

/// Local-only preview of one step
#[derive(Debug, Clone, Default)]
pub struct StepPlan {
    /// Whether applying would execute anything
    pub due: bool,
    /// Human-readable lines describing the pending work (pre-redacted)
    pub detail: Vec<String>,
}

impl StepPlan {
    pub fn unchanged() -> Self {
        Self {
            due: false,
            detail: vec![],
        }
    }

    pub fn due_with(detail: Vec<String>) -> Self {
        Self { due: true, detail }
    }
}

/// Shared context handed to each step during apply
pub struct StepContext<'a> {
    pub channel: &'a dyn RemoteChannel,
    pub state: &'a mut StateFile,
    pub events: &'a dyn EventSink,
    /// Values exported by steps for the final report; secrets stay wrapped
    exports: BTreeMap<String, ExportedValue>,
    /// Remote paths written by this step, in upload order
    written: Vec<String>,
}

/// One exported value
#[derive(Debug, Clone)]
pub enum ExportedValue {
    Plain(String),
    Secret(SecretString),
}

impl<'a> StepContext<'a> {
    pub fn new(
        channel: &'a dyn RemoteChannel,
        state: &'a mut StateFile,
        events: &'a dyn EventSink,
    ) -> Self {
        Self {
            channel,
            state,
            events,
            exports: BTreeMap::new(),
            written: Vec::new(),
        }
    }

    /// Record a remote path this step wrote
    pub fn record_written(&mut self, remote_path: &str) {
        self.written.push(remote_path.to_string());
    }

    pub fn take_written(&mut self) -> Vec<String> {
        std::mem::take(&mut self.written)
    }

    /// Export a value for the final report
    pub fn export(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.exports
            .insert(key.into(), ExportedValue::Plain(value.into()));
    }

    /// Export a sensitive value; the report shows it redacted
    pub fn export_secret(&mut self, key: impl Into<String>, value: SecretString) {
        self.exports.insert(key.into(), ExportedValue::Secret(value));
    }

    pub fn exports(&self) -> &BTreeMap<String, ExportedValue> {
        &self.exports
    }

    pub fn take_exports(&mut self) -> BTreeMap<String, ExportedValue> {
        std::mem::take(&mut self.exports)
    }
}

/// Trait for task graph nodes
pub trait ProvisionStep {
    /// Short kind label for events ("deploy", "command", ...)
    fn kind(&self) -> &'static str;

    /// Local-only preview against recorded state; never touches the network
    fn plan(&self, state: &StateFile) -> HostsmithResult<StepPlan>;

    /// Execute against the remote channel, recording new state on success
    fn apply(&self, ctx: &mut StepContext<'_>) -> HostsmithResult<StepOutcome>;

    /// Preview with remote context (e.g. content diffs); defaults to the
    /// local plan detail
    fn diff(
        &self,
        state: &StateFile,
        _channel: &dyn RemoteChannel,
    ) -> HostsmithResult<Vec<String>> {
        self.plan(state).map(|p| p.detail)
    }
}

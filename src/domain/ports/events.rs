//! Apply Event Port
//!
//! Events emitted while walking the task graph, consumed by the human
//! and NDJSON sinks. Sensitive material never appears in event payloads;
//! command lines arrive pre-redacted.

/// One observable moment during an apply or plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyEvent {
    /// Walking started
    Started { host: String, step_count: usize },
    /// A step began executing
    StepStarted { step: String, kind: String },
    /// A step was skipped because its recorded state matches
    StepUnchanged { step: String },
    /// One artifact was uploaded
    FileUploaded { step: String, remote_path: String },
    /// One artifact already matched and was not uploaded
    FileUnchanged { step: String, remote_path: String },
    /// The unit's post-run trigger executed (command pre-redacted)
    TriggerRun { step: String, command: String },
    /// A step finished successfully
    StepCompleted { step: String },
    /// A step failed; the apply stops here
    StepFailed { step: String, error: String },
    /// Walking finished
    Completed { applied: usize, unchanged: usize },
}

/// Trait for event consumers
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: ApplyEvent);
}

/// Sink that discards all events
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn on_event(&self, _event: ApplyEvent) {}
}

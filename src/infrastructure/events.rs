//! Event sinks
//!
//! Two consumers for apply events: a human-readable sink writing to
//! stderr and an NDJSON sink writing to stdout for CI and automation.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{ApplyEvent, EventSink};

/// Human-readable progress lines on stderr
pub struct HumanEventSink {
    verbose: bool,
}

impl HumanEventSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl EventSink for HumanEventSink {
    fn on_event(&self, event: ApplyEvent) {
        match event {
            ApplyEvent::Started { host, step_count } => {
                eprintln!("Applying {} steps to {}", step_count, host);
            }
            ApplyEvent::StepStarted { step, kind } => {
                if self.verbose {
                    eprintln!("  [{}] {} ...", kind, step);
                }
            }
            ApplyEvent::StepUnchanged { step } => {
                if self.verbose {
                    eprintln!("  {} unchanged", step);
                }
            }
            ApplyEvent::FileUploaded { remote_path, .. } => {
                eprintln!("  uploaded {}", remote_path);
            }
            ApplyEvent::FileUnchanged { remote_path, .. } => {
                if self.verbose {
                    eprintln!("  unchanged {}", remote_path);
                }
            }
            ApplyEvent::TriggerRun { step, command } => {
                eprintln!("  {} trigger: {}", step, command);
            }
            ApplyEvent::StepCompleted { step } => {
                eprintln!("  {} done", step);
            }
            ApplyEvent::StepFailed { step, error } => {
                eprintln!("  {} failed: {}", step, error);
            }
            ApplyEvent::Completed { applied, unchanged } => {
                eprintln!("Done: {} applied, {} unchanged", applied, unchanged);
            }
        }
    }
}

/// NDJSON event stream on stdout
pub struct JsonEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Sink writing to a custom writer (for testing)
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl EventSink for JsonEventSink {
    fn on_event(&self, event: ApplyEvent) {
        let json = match event {
            ApplyEvent::Started { host, step_count } => serde_json::json!({
                "event": "start",
                "host": host,
                "step_count": step_count,
            }),
            ApplyEvent::StepStarted { step, kind } => serde_json::json!({
                "event": "step_start",
                "step": step,
                "kind": kind,
            }),
            ApplyEvent::StepUnchanged { step } => serde_json::json!({
                "event": "step_unchanged",
                "step": step,
            }),
            ApplyEvent::FileUploaded { step, remote_path } => serde_json::json!({
                "event": "file_uploaded",
                "step": step,
                "path": remote_path,
            }),
            ApplyEvent::FileUnchanged { step, remote_path } => serde_json::json!({
                "event": "file_unchanged",
                "step": step,
                "path": remote_path,
            }),
            ApplyEvent::TriggerRun { step, command } => serde_json::json!({
                "event": "trigger",
                "step": step,
                "command": command,
            }),
            ApplyEvent::StepCompleted { step } => serde_json::json!({
                "event": "step_done",
                "step": step,
            }),
            ApplyEvent::StepFailed { step, error } => serde_json::json!({
                "event": "step_failed",
                "step": step,
                "error": error,
            }),
            ApplyEvent::Completed { applied, unchanged } => serde_json::json!({
                "event": "done",
                "applied": applied,
                "unchanged": unchanged,
            }),
        };
        self.write_event(json);
    }
}

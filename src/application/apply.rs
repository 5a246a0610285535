//! Graph applier
//!
//! Walks the task graph in topological order, consulting the state file so
//! unchanged steps are skipped, persisting state after every step, and
//! emitting events along the way. The walk stops at the first failed step;
//! state recorded for completed work survives, so a later apply resumes
//! where this one stopped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::application::ProvisionGraph;
use crate::domain::ports::step::ExportedValue;
use crate::domain::ports::{
    ApplyEvent, EventSink, RemoteChannel, StateRepository, StepContext, StepOutcome,
};
use crate::error::HostsmithResult;

/// Result of walking the graph with `apply`
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Step names that executed remote operations
    pub applied: Vec<String>,
    /// Step names whose recorded state already matched
    pub unchanged: Vec<String>,
    /// Remote paths written across all steps, in upload order
    pub written: Vec<String>,
    /// Values exported by steps; secrets stay wrapped
    pub exports: BTreeMap<String, ExportedValue>,
}

impl ApplyReport {
    pub fn has_changes(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Preview of one step from `plan`
#[derive(Debug, Clone)]
pub struct StepPreview {
    pub name: String,
    pub kind: String,
    pub due: bool,
    pub detail: Vec<String>,
}

/// Result of walking the graph with `plan`
#[derive(Debug, Clone, Default)]
pub struct PlanReport {
    pub steps: Vec<StepPreview>,
}

impl PlanReport {
    pub fn due_count(&self) -> usize {
        self.steps.iter().filter(|s| s.due).count()
    }

    pub fn is_up_to_date(&self) -> bool {
        self.due_count() == 0
    }
}

/// Walks the task graph against one remote host
pub struct Applier<'a> {
    channel: &'a dyn RemoteChannel,
    state_repo: &'a dyn StateRepository,
    state_path: PathBuf,
    events: &'a dyn EventSink,
}

impl<'a> Applier<'a> {
    pub fn new(
        channel: &'a dyn RemoteChannel,
        state_repo: &'a dyn StateRepository,
        state_path: impl Into<PathBuf>,
        events: &'a dyn EventSink,
    ) -> Self {
        Self {
            channel,
            state_repo,
            state_path: state_path.into(),
            events,
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Apply every due step in dependency order
    pub fn apply(&self, graph: &ProvisionGraph) -> HostsmithResult<ApplyReport> {
        let order = graph.topological_order()?;
        let mut state = self.state_repo.load_or_new(&self.state_path);
        let mut report = ApplyReport::default();

        self.events.on_event(ApplyEvent::Started {
            host: self.channel.host().to_string(),
            step_count: order.len(),
        });

        for id in order {
            let name = graph.name(id).to_string();
            let step = graph.payload(id);

            self.events.on_event(ApplyEvent::StepStarted {
                step: name.clone(),
                kind: step.kind().to_string(),
            });

            let outcome = {
                let mut ctx = StepContext::new(self.channel, &mut state, self.events);
                let outcome = step.apply(&mut ctx);
                report.written.extend(ctx.take_written());
                report.exports.extend(ctx.take_exports());
                outcome
            };

            match outcome {
                Ok(StepOutcome::Applied) => {
                    state.touch();
                    self.state_repo.save(&self.state_path, &state)?;
                    self.events
                        .on_event(ApplyEvent::StepCompleted { step: name.clone() });
                    report.applied.push(name);
                }
                Ok(StepOutcome::Unchanged) => {
                    self.events
                        .on_event(ApplyEvent::StepUnchanged { step: name.clone() });
                    report.unchanged.push(name);
                }
                Err(error) => {
                    // Uploads that succeeded before the failure are already
                    // recorded; persist them so the next apply resumes.
                    state.touch();
                    self.state_repo.save(&self.state_path, &state)?;
                    self.events.on_event(ApplyEvent::StepFailed {
                        step: name,
                        error: error.to_string(),
                    });
                    return Err(error);
                }
            }
        }

        self.events.on_event(ApplyEvent::Completed {
            applied: report.applied.len(),
            unchanged: report.unchanged.len(),
        });
        Ok(report)
    }

    /// Local-only preview of every step in dependency order
    pub fn plan(&self, graph: &ProvisionGraph) -> HostsmithResult<PlanReport> {
        let order = graph.topological_order()?;
        let state = self.state_repo.load_or_new(&self.state_path);
        let mut report = PlanReport::default();

        for id in order {
            let step = graph.payload(id);
            let plan = step.plan(&state)?;
            report.steps.push(StepPreview {
                name: graph.name(id).to_string(),
                kind: step.kind().to_string(),
                due: plan.due,
                detail: plan.detail,
            });
        }
        Ok(report)
    }

    /// Preview with remote content diffs for changed artifacts
    pub fn diff(&self, graph: &ProvisionGraph) -> HostsmithResult<PlanReport> {
        let order = graph.topological_order()?;
        let state = self.state_repo.load_or_new(&self.state_path);
        let mut report = PlanReport::default();

        for id in order {
            let step = graph.payload(id);
            let plan = step.plan(&state)?;
            let detail = if plan.due {
                step.diff(&state, self.channel)?
            } else {
                vec![]
            };
            report.steps.push(StepPreview {
                name: graph.name(id).to_string(),
                kind: step.kind().to_string(),
                due: plan.due,
                detail,
            });
        }
        Ok(report)
    }
}

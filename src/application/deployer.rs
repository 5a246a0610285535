//! Config file deploy step
//!
//! Wraps a [`DeployUnit`] as a task graph node: plan the unit, stage
//! rendered artifacts when a staging directory is configured, upload every
//! changed artifact, then run the post-run trigger once all uploads in the
//! unit have succeeded. The trigger never runs when an upload failed.

use std::fs;

use similar::TextDiff;

use crate::domain::entities::{DeployUnit, StateFile};
use crate::domain::ports::{
    ApplyEvent, ProvisionStep, RemoteChannel, StepContext, StepOutcome, StepPlan,
};
use crate::domain::services::planner::{plan_unit, staging_slot, UnitPlan};
use crate::error::HostsmithResult;

/// Marker shown instead of content for sensitive artifacts
const SENSITIVE_NOTE: &str = "(contents redacted)";

/// A config-file deployment in the task graph
pub struct DeployStep {
    unit: DeployUnit,
}

impl DeployStep {
    pub fn new(unit: DeployUnit) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> &DeployUnit {
        &self.unit
    }

    /// Write rendered artifacts into their content-addressed staging slots
    fn stage(&self, plan: &UnitPlan) -> HostsmithResult<()> {
        let Some(staging_dir) = self.unit.staging_dir() else {
            return Ok(());
        };
        if self.unit.mapping().is_none() {
            return Ok(());
        }

        let dir = staging_dir.join(self.unit.name());
        fs::create_dir_all(&dir)?;
        for upload in &plan.uploads {
            let slot = dir.join(staging_slot(&upload.relative));
            fs::write(slot, upload.file.content())?;
        }
        Ok(())
    }

    fn plan_lines(&self, plan: &UnitPlan, state: &StateFile) -> Vec<String> {
        let mut detail = Vec::new();
        for upload in &plan.uploads {
            if !upload.changed {
                continue;
            }
            let path = upload.file.remote_path().as_str();
            let verb = if state.file_hash(path).is_some() {
                "update"
            } else {
                "create"
            };
            if upload.file.is_sensitive() {
                detail.push(format!("{} {} {}", verb, path, SENSITIVE_NOTE));
            } else {
                detail.push(format!("{} {}", verb, path));
            }
        }
        if plan.trigger_due {
            if let Some(trigger) = self.unit.trigger() {
                detail.push(format!("trigger: {}", trigger.redacted()));
            }
        }
        detail
    }
}

impl ProvisionStep for DeployStep {
    fn kind(&self) -> &'static str {
        "deploy"
    }

    fn plan(&self, state: &StateFile) -> HostsmithResult<StepPlan> {
        let plan = plan_unit(&self.unit, state)?;
        if !plan.has_changes() {
            return Ok(StepPlan::unchanged());
        }
        Ok(StepPlan::due_with(self.plan_lines(&plan, state)))
    }

    fn apply(&self, ctx: &mut StepContext<'_>) -> HostsmithResult<StepOutcome> {
        let plan = plan_unit(&self.unit, ctx.state)?;
        if !plan.has_changes() {
            return Ok(StepOutcome::Unchanged);
        }

        self.stage(&plan)?;

        for upload in &plan.uploads {
            let path = upload.file.remote_path();
            if !upload.changed {
                ctx.events.on_event(ApplyEvent::FileUnchanged {
                    step: self.unit.name().to_string(),
                    remote_path: path.as_str().to_string(),
                });
                continue;
            }
            ctx.channel.copy(path, upload.file.content())?;
            ctx.state
                .set_file_hash(path.as_str(), &upload.file.content_hash());
            ctx.record_written(path.as_str());
            ctx.events.on_event(ApplyEvent::FileUploaded {
                step: self.unit.name().to_string(),
                remote_path: path.as_str().to_string(),
            });
        }

        if plan.trigger_due {
            let trigger = self
                .unit
                .trigger()
                .expect("trigger_due implies a trigger is configured");
            ctx.channel.run(&trigger.render())?.check()?;
            ctx.events.on_event(ApplyEvent::TriggerRun {
                step: self.unit.name().to_string(),
                command: trigger.redacted(),
            });
        }

        ctx.state
            .set_step_fingerprint(self.unit.name(), &plan.fingerprint);
        Ok(StepOutcome::Applied)
    }

    /// Unified diffs of changed artifacts against current remote content
    ///
    /// Sensitive artifacts are listed without contents.
    fn diff(
        &self,
        state: &StateFile,
        channel: &dyn RemoteChannel,
    ) -> HostsmithResult<Vec<String>> {
        let plan = plan_unit(&self.unit, state)?;
        let mut lines = Vec::new();

        for upload in &plan.uploads {
            if !upload.changed {
                continue;
            }
            let path = upload.file.remote_path();
            if upload.file.is_sensitive() {
                lines.push(format!("--- {} {}", path, SENSITIVE_NOTE));
                continue;
            }
            let Some(new_text) = upload.file.content_text() else {
                lines.push(format!("--- {} (binary)", path));
                continue;
            };

            let current = channel
                .run(&format!("cat {}", crate::domain::value_objects::shell_quote(path.as_str())))?;
            let old_text = if current.success() {
                current.stdout
            } else {
                String::new()
            };

            let diff = TextDiff::from_lines(old_text.as_str(), new_text);
            lines.push(format!("--- {}", path));
            for change in diff.iter_all_changes() {
                let sign = match change.tag() {
                    similar::ChangeTag::Delete => "-",
                    similar::ChangeTag::Insert => "+",
                    similar::ChangeTag::Equal => " ",
                };
                lines.push(format!("{}{}", sign, change.value().trim_end_matches('\n')));
            }
        }

        if plan.trigger_due {
            if let Some(trigger) = self.unit.trigger() {
                lines.push(format!("trigger: {}", trigger.redacted()));
            }
        }
        Ok(lines)
    }
}

//! Command step
//!
//! One remote shell command as a task graph node. Fingerprinted by its
//! rendered line so an unchanged command is skipped on re-apply and a
//! changed one (including a changed secret) runs again.

use crate::domain::entities::StateFile;
use crate::domain::ports::{ProvisionStep, StepContext, StepOutcome, StepPlan};
use crate::domain::value_objects::{ContentHash, RemoteCommand};
use crate::error::HostsmithResult;

/// A single remote command in the task graph
pub struct CommandStep {
    name: String,
    command: RemoteCommand,
}

impl CommandStep {
    pub fn new(name: impl Into<String>, command: RemoteCommand) -> Self {
        Self {
            name: name.into(),
            command,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &RemoteCommand {
        &self.command
    }

    /// State fingerprint for the rendered line; secrets are hashed, never
    /// stored in clear
    fn fingerprint(&self) -> ContentHash {
        ContentHash::from_content(&self.command.render())
    }

    fn is_due(&self, state: &StateFile) -> bool {
        !state.step_matches(&self.name, &self.fingerprint())
    }
}

impl ProvisionStep for CommandStep {
    fn kind(&self) -> &'static str {
        "command"
    }

    fn plan(&self, state: &StateFile) -> HostsmithResult<StepPlan> {
        if self.is_due(state) {
            Ok(StepPlan::due_with(vec![format!(
                "run: {}",
                self.command.redacted()
            )]))
        } else {
            Ok(StepPlan::unchanged())
        }
    }

    fn apply(&self, ctx: &mut StepContext<'_>) -> HostsmithResult<StepOutcome> {
        if !self.is_due(ctx.state) {
            return Ok(StepOutcome::Unchanged);
        }

        ctx.channel.run(&self.command.render())?.check()?;
        ctx.state.set_step_fingerprint(&self.name, &self.fingerprint());
        Ok(StepOutcome::Applied)
    }
}

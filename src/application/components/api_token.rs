//! API token creation
//!
//! Creates an automation token on the host and exports the resulting
//! credential as a secret. The token value only ever exists in the command
//! output and the wrapped export; it is never logged or written to state.

use serde_json::Value;

use crate::application::ProvisionGraph;
use crate::config::ApiTokenConfig;
use crate::domain::entities::StateFile;
use crate::domain::ports::{ProvisionStep, StepContext, StepOutcome, StepPlan};
use crate::domain::services::NodeId;
use crate::domain::value_objects::{ContentHash, RemoteCommand, SecretString};
use crate::error::{HostsmithError, HostsmithResult};

/// Extract `<tokenid>=<value>` from the token creation response
pub fn full_token_id(response: &Value) -> HostsmithResult<String> {
    let token_id = response
        .get("full-tokenid")
        .and_then(Value::as_str)
        .ok_or_else(|| HostsmithError::UnexpectedResponse {
            message: "token response is missing 'full-tokenid'".to_string(),
        })?;
    let value = response
        .get("value")
        .and_then(Value::as_str)
        .ok_or_else(|| HostsmithError::UnexpectedResponse {
            message: "token response is missing 'value'".to_string(),
        })?;
    Ok(format!("{}={}", token_id, value))
}

struct ApiTokenStep {
    username: String,
    token_name: String,
}

impl ApiTokenStep {
    fn command(&self) -> RemoteCommand {
        RemoteCommand::new("pveum")
            .arg("user")
            .arg("token")
            .arg("add")
            .value(format!("{}@pam", self.username))
            .value(&self.token_name)
            .arg("-privsep")
            .arg("0")
            .option("comment", "Created by hostsmith.")
            .option("output-format", "json")
    }

    fn fingerprint(&self) -> ContentHash {
        ContentHash::from_content(&format!("api-token\0{}\0{}", self.username, self.token_name))
    }
}

impl ProvisionStep for ApiTokenStep {
    fn kind(&self) -> &'static str {
        "api-token"
    }

    fn plan(&self, state: &StateFile) -> HostsmithResult<StepPlan> {
        if state.step_matches("api-token", &self.fingerprint()) {
            return Ok(StepPlan::unchanged());
        }
        Ok(StepPlan::due_with(vec![format!(
            "create API token '{}' for {}@pam",
            self.token_name, self.username
        )]))
    }

    fn apply(&self, ctx: &mut StepContext<'_>) -> HostsmithResult<StepOutcome> {
        if ctx.state.step_matches("api-token", &self.fingerprint()) {
            return Ok(StepOutcome::Unchanged);
        }

        let output = ctx.channel.run(&self.command().render())?.check()?;
        let response: Value = serde_json::from_str(&output.stdout)?;
        let credential = full_token_id(&response)?;
        ctx.export_secret("api-token", SecretString::new(credential));

        ctx.state
            .set_step_fingerprint("api-token", &self.fingerprint());
        Ok(StepOutcome::Applied)
    }
}

/// Register the token creation step
pub fn register(graph: &mut ProvisionGraph, cfg: &ApiTokenConfig) -> NodeId {
    graph.add_node(
        "api-token",
        Box::new(ApiTokenStep {
            username: cfg.username.clone(),
            token_name: cfg.name.clone(),
        }) as _,
    )
}

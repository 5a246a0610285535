//! TLS certificate issuance
//!
//! Three steps against the host's built-in ACME client: account
//! registration (with the directory URL selected at apply time from the
//! host's advertised list), DNS plugin setup, and the certificate order.
//! The order step depends on both of the others.

use serde_json::Value;

use crate::application::ProvisionGraph;
use crate::config::AcmeConfig;
use crate::domain::entities::StateFile;
use crate::domain::ports::{ProvisionStep, StepContext, StepOutcome, StepPlan};
use crate::domain::services::NodeId;
use crate::domain::value_objects::{ContentHash, RemoteCommand, SecretString};
use crate::error::{HostsmithError, HostsmithResult};

/// Remote scratch file for plugin credentials; removed in the same command
const PLUGIN_DATA_FILE: &str = ".acme-plugin-data";

/// Pick the directory URL matching the staging flag
///
/// An entry matches when its name contains "staging" (case-insensitive)
/// exactly if staging mode is requested.
pub fn directory_url(directories: &Value, staging: bool) -> HostsmithResult<String> {
    let entries = directories
        .as_array()
        .ok_or_else(|| HostsmithError::UnexpectedResponse {
            message: "ACME directory list is not an array".to_string(),
        })?;

    for entry in entries {
        let name = entry.get("name").and_then(Value::as_str).unwrap_or("");
        if name.to_lowercase().contains("staging") == staging {
            if let Some(url) = entry.get("url").and_then(Value::as_str) {
                return Ok(url.to_string());
            }
        }
    }

    Err(HostsmithError::AcmeDirectoryNotFound { staging })
}

/// Registers the ACME account, selecting the directory at apply time
struct AccountStep {
    account_name: String,
    contact: String,
    staging: bool,
}

impl AccountStep {
    fn fingerprint(&self) -> ContentHash {
        ContentHash::from_content(&format!(
            "account\0{}\0{}\0{}",
            self.account_name, self.contact, self.staging
        ))
    }
}

impl ProvisionStep for AccountStep {
    fn kind(&self) -> &'static str {
        "acme-account"
    }

    fn plan(&self, state: &StateFile) -> HostsmithResult<StepPlan> {
        if state.step_matches("acme-account", &self.fingerprint()) {
            return Ok(StepPlan::unchanged());
        }
        Ok(StepPlan::due_with(vec![
            "query advertised ACME directories and terms of service".to_string(),
            format!(
                "register account '{}' ({} directory)",
                self.account_name,
                if self.staging { "staging" } else { "production" }
            ),
        ]))
    }

    fn apply(&self, ctx: &mut StepContext<'_>) -> HostsmithResult<StepOutcome> {
        if ctx.state.step_matches("acme-account", &self.fingerprint()) {
            return Ok(StepOutcome::Unchanged);
        }

        let directories = ctx
            .channel
            .run(
                &RemoteCommand::new("pvesh")
                    .arg("get")
                    .arg("/cluster/acme/directories")
                    .option("output-format", "json")
                    .render(),
            )?
            .check()?;
        let directories: Value = serde_json::from_str(&directories.stdout)?;
        let directory = directory_url(&directories, self.staging)?;

        let terms = ctx
            .channel
            .run(
                &RemoteCommand::new("pvesh")
                    .arg("get")
                    .arg("/cluster/acme/tos")
                    .option("output-format", "json")
                    .render(),
            )?
            .check()?;
        let terms: Value = serde_json::from_str(&terms.stdout)?;
        let terms = terms
            .as_str()
            .ok_or_else(|| HostsmithError::UnexpectedResponse {
                message: "ACME terms of service response is not a string".to_string(),
            })?;

        let register = RemoteCommand::new("pvesh")
            .arg("create")
            .arg("/cluster/acme/account")
            .option("name", &self.account_name)
            .option("contact", &self.contact)
            .option("directory", &directory)
            .option("tos_url", terms);
        ctx.channel.run(&register.render())?.check()?;

        ctx.state
            .set_step_fingerprint("acme-account", &self.fingerprint());
        Ok(StepOutcome::Applied)
    }
}

/// Build the plugin setup command: write credentials to a scratch file,
/// add the DNS plugin, remove the scratch file
fn plugin_command(plugin: &str, api: &str, data: &[(String, SecretString)]) -> RemoteCommand {
    let mut write = RemoteCommand::new("printf").value("%s\\n");
    for (key, value) in data {
        write = write.secret_value(&SecretString::new(format!("{}={}", key, value.expose())));
    }
    let write = write.write_to(PLUGIN_DATA_FILE);

    write
        .and_then(
            RemoteCommand::new("pvenode")
                .arg("acme")
                .arg("plugin")
                .arg("add")
                .arg("dns")
                .value(plugin)
                .option("api", api)
                .option("data", PLUGIN_DATA_FILE),
        )
        .and_then(RemoteCommand::new("rm").arg("-f").value(PLUGIN_DATA_FILE))
}

/// Build the order command: bind the domain and account, then force an order
fn order_command(domain: &str, plugin: &str, account: &str) -> RemoteCommand {
    RemoteCommand::new("pvenode")
        .arg("config")
        .arg("set")
        .option("acmedomain0", format!("domain={},plugin={}", domain, plugin))
        .and_then(
            RemoteCommand::new("pvenode")
                .arg("config")
                .arg("set")
                .option("acme", format!("account={}", account)),
        )
        .and_then(
            RemoteCommand::new("pvenode")
                .arg("acme")
                .arg("cert")
                .arg("order")
                .option("force", "1"),
        )
}

/// Register the certificate steps; returns the final order node
pub fn register(graph: &mut ProvisionGraph, cfg: &AcmeConfig) -> NodeId {
    let account = graph.add_node(
        "acme-account",
        Box::new(AccountStep {
            account_name: cfg.account.name.clone(),
            contact: cfg.account.contact.clone(),
            staging: cfg.staging,
        }) as _,
    );

    let data: Vec<(String, SecretString)> = cfg
        .plugin
        .data
        .iter()
        .map(|d| (d.key.clone(), d.value.clone()))
        .collect();
    let plugin = graph.add_node(
        "acme-plugin",
        Box::new(crate::application::command_step::CommandStep::new(
            "acme-plugin",
            plugin_command(&cfg.plugin.name, &cfg.plugin.api, &data),
        )) as _,
    );

    let order = graph.add_node(
        "acme-order",
        Box::new(crate::application::command_step::CommandStep::new(
            "acme-order",
            order_command(&cfg.domain, &cfg.plugin.name, &cfg.account.name),
        )) as _,
    );
    graph.depends(order, account);
    graph.depends(order, plugin);

    order
}

//! Metrics exporter install and scrape-target configuration
//!
//! Installs the exporter on the host (service account, venv install,
//! config deploy with a systemd trigger), then pushes the scrape
//! configuration into the metrics container and restarts it. The scrape
//! config is ordered after the exporter so the first scrape finds a
//! listening endpoint.

use crate::application::command_step::CommandStep;
use crate::application::deployer::DeployStep;
use crate::application::ProvisionGraph;
use crate::config::MetricsConfig;
use crate::domain::entities::DeployUnit;
use crate::domain::services::NodeId;
use crate::domain::value_objects::{ConfigMap, RemoteCommand};

use super::AssetPaths;

/// Where the exporter's virtualenv lives on the host
const VENV_PATH: &str = "/opt/prometheus-pve-exporter";

/// Exporter config path referenced by the systemd unit
const EXPORTER_CONFIG: &str = "/etc/prometheus/pve.yml";

/// Staged scrape config pushed into the metrics container
const SCRAPE_STAGING: &str = "/tmp/prometheus.yml";

fn user_command(cfg: &MetricsConfig) -> RemoteCommand {
    let username = &cfg.exporter.username;
    RemoteCommand::new("pveum")
        .arg("user")
        .arg("add")
        .value(format!("{}@pve", username))
        .secret_option("password", &cfg.exporter.password)
        .option("comment", "Metrics exporter service account.")
        .and_then(
            RemoteCommand::new("pveum")
                .arg("acl")
                .arg("modify")
                .arg("/")
                .arg("-user")
                .value(format!("{}@pve", username))
                .arg("-role")
                .arg("PVEAuditor"),
        )
        .and_then(
            RemoteCommand::new("useradd")
                .arg("-s")
                .arg("/bin/false")
                .value(username),
        )
}

fn install_command() -> RemoteCommand {
    RemoteCommand::new("apt-get")
        .arg("update")
        .arg("-y")
        .and_then(
            RemoteCommand::new("apt-get")
                .arg("install")
                .arg("-y")
                .arg("python3-venv"),
        )
        .and_then(
            RemoteCommand::new("python3")
                .arg("-m")
                .arg("venv")
                .value(VENV_PATH),
        )
        .and_then(
            RemoteCommand::new(format!("{}/bin/pip", VENV_PATH))
                .arg("install")
                .arg("prometheus-pve-exporter"),
        )
}

fn exporter_trigger(cfg: &MetricsConfig) -> RemoteCommand {
    RemoteCommand::new("chown")
        .value(format!("root:{}", cfg.exporter.username))
        .value(EXPORTER_CONFIG)
        .and_then(RemoteCommand::new("chmod").arg("640").value(EXPORTER_CONFIG))
        .and_then(RemoteCommand::new("systemctl").arg("daemon-reload"))
        .and_then(
            RemoteCommand::new("systemctl")
                .arg("enable")
                .value("prometheus-pve-exporter.service"),
        )
        .and_then(
            RemoteCommand::new("systemctl")
                .arg("start")
                .value("prometheus-pve-exporter.service"),
        )
}

fn scrape_trigger(cfg: &MetricsConfig) -> RemoteCommand {
    let vmid = cfg.exporter.vmid.to_string();
    RemoteCommand::new("pct")
        .arg("push")
        .value(&vmid)
        .value(SCRAPE_STAGING)
        .value("/etc/prometheus/prometheus.yml")
        .and_then(RemoteCommand::new("rm").arg("-f").value(SCRAPE_STAGING))
        .and_then(
            RemoteCommand::new("pct")
                .arg("exec")
                .value(&vmid)
                .arg("systemctl")
                .arg("restart")
                .arg("prometheus"),
        )
}

fn exporter_mapping(cfg: &MetricsConfig) -> ConfigMap {
    let mut map = ConfigMap::new();
    map.insert("username", &cfg.exporter.username);
    map.insert_secret("password", &cfg.exporter.password);
    map
}

fn scrape_mapping(cfg: &MetricsConfig) -> ConfigMap {
    let mut map = ConfigMap::new();
    map.insert("target", &cfg.local.target);
    map.insert("remote_url", &cfg.local.remote_url);
    map.insert("remote_username", &cfg.local.remote_username);
    map.insert_secret("remote_password", &cfg.local.remote_password);
    map
}

/// Register the metrics steps; returns the scrape config node
pub fn register(graph: &mut ProvisionGraph, cfg: &MetricsConfig, paths: &AssetPaths) -> NodeId {
    let user = graph.add_node(
        "metrics-exporter-user",
        Box::new(CommandStep::new("metrics-exporter-user", user_command(cfg))) as _,
    );

    let install = graph.add_node(
        "metrics-exporter-install",
        Box::new(CommandStep::new(
            "metrics-exporter-install",
            install_command(),
        )) as _,
    );

    let prometheus_dir = paths.component("prometheus");

    let mut exporter_unit = DeployUnit::new("metrics-exporter", prometheus_dir.join("exporter"))
        .with_patterns(&["*.yml", "*.service"])
        .with_mapping(exporter_mapping(cfg))
        .with_trigger(exporter_trigger(cfg));
    if let Some(staging) = &paths.staging {
        exporter_unit = exporter_unit.with_staging_dir(staging);
    }
    let exporter = graph.add_node(
        "metrics-exporter",
        Box::new(DeployStep::new(exporter_unit)) as _,
    );
    graph.depends(exporter, user);
    graph.depends(exporter, install);

    let mut scrape_unit = DeployUnit::new("metrics-scrape", prometheus_dir.join("local"))
        .with_patterns(&["*.yml"])
        .with_mapping(scrape_mapping(cfg))
        .with_trigger(scrape_trigger(cfg));
    if let Some(staging) = &paths.staging {
        scrape_unit = scrape_unit.with_staging_dir(staging);
    }
    let scrape = graph.add_node("metrics-scrape", Box::new(DeployStep::new(scrape_unit)) as _);
    graph.depends(scrape, exporter);

    scrape
}

//! Backup storage and scheduled jobs
//!
//! Three ordered steps: mount the backup filesystem (with an fstab entry so
//! it survives reboots), register it as a backup storage, then deploy the
//! scheduled job files rendered with the backup mapping.

use crate::application::command_step::CommandStep;
use crate::application::deployer::DeployStep;
use crate::application::ProvisionGraph;
use crate::config::BackupConfig;
use crate::domain::entities::DeployUnit;
use crate::domain::services::NodeId;
use crate::domain::value_objects::{ConfigMap, RemoteCommand};

use super::AssetPaths;

fn mount_command(cfg: &BackupConfig) -> RemoteCommand {
    let fstab_line = format!("{} {} ext4 defaults 0", cfg.filesystem, cfg.mountpoint);
    RemoteCommand::new("mkdir")
        .arg("-p")
        .value(&cfg.mountpoint)
        .and_then(
            RemoteCommand::new("echo")
                .value(fstab_line)
                .append_to("/etc/fstab"),
        )
        .and_then(RemoteCommand::new("systemctl").arg("daemon-reload"))
        .and_then(RemoteCommand::new("mount").arg("-a"))
}

fn storage_command(cfg: &BackupConfig) -> RemoteCommand {
    RemoteCommand::new("pvesm")
        .arg("add")
        .arg("dir")
        .value(&cfg.storage)
        .option("path", &cfg.mountpoint)
        .option("content", "backup")
        .option("prune-backups", "keep-all=1")
        .option("shared", "0")
}

fn mapping(cfg: &BackupConfig) -> ConfigMap {
    let mut map = ConfigMap::new();
    map.insert("filesystem", &cfg.filesystem);
    map.insert("mountpoint", &cfg.mountpoint);
    map.insert("storage", &cfg.storage);
    map.insert("schedule", &cfg.schedule);
    map
}

/// Register the backup steps; returns the jobs deploy node
pub fn register(graph: &mut ProvisionGraph, cfg: &BackupConfig, paths: &AssetPaths) -> NodeId {
    let mount = graph.add_node(
        "backup-mount",
        Box::new(CommandStep::new("backup-mount", mount_command(cfg))) as _,
    );

    let storage = graph.add_node(
        "backup-storage",
        Box::new(CommandStep::new("backup-storage", storage_command(cfg))) as _,
    );
    graph.depends(storage, mount);

    let mut unit =
        DeployUnit::new("backup-jobs", paths.component("backup")).with_mapping(mapping(cfg));
    if let Some(staging) = &paths.staging {
        unit = unit.with_staging_dir(staging);
    }
    let jobs = graph.add_node("backup-jobs", Box::new(DeployStep::new(unit)) as _);
    graph.depends(jobs, storage);

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn cfg() -> BackupConfig {
        BackupConfig {
            filesystem: "/dev/tank/backup".to_string(),
            mountpoint: "/srv/backup".to_string(),
            storage: "tank-backup".to_string(),
            schedule: "02:30".to_string(),
        }
    }

    #[test]
    fn mount_command_appends_fstab_line() {
        let line = mount_command(&cfg()).render();
        assert!(line.contains("'/dev/tank/backup /srv/backup ext4 defaults 0' >> '/etc/fstab'"));
        assert!(line.ends_with("mount -a"));
    }

    #[test]
    fn storage_command_registers_backup_dir() {
        let line = storage_command(&cfg()).render();
        assert!(line.contains("pvesm add dir 'tank-backup'"));
        assert!(line.contains("'--content=backup'"));
        assert!(line.contains("'--prune-backups=keep-all=1'"));
    }

    #[test]
    fn register_orders_mount_storage_jobs() {
        let mut graph = ProvisionGraph::new();
        let paths = AssetPaths {
            root: PathBuf::from("assets"),
            staging: None,
        };
        register(&mut graph, &cfg(), &paths);

        let order = graph.topological_order().unwrap();
        let names: Vec<_> = order.iter().map(|&id| graph.name(id)).collect();
        assert_eq!(names, vec!["backup-mount", "backup-storage", "backup-jobs"]);
    }

    #[test]
    fn mapping_covers_job_template_keys() {
        let map = mapping(&cfg());
        for key in ["filesystem", "mountpoint", "storage", "schedule"] {
            assert!(map.contains_key(key), "missing key {key}");
        }
    }
}

//! Bootloader configuration deploy
//!
//! Copies the bootloader asset folder verbatim (no mapping) and regenerates
//! the boot configuration afterwards.

use crate::application::deployer::DeployStep;
use crate::application::ProvisionGraph;
use crate::domain::entities::DeployUnit;
use crate::domain::services::NodeId;
use crate::domain::value_objects::RemoteCommand;

use super::AssetPaths;

/// Register the bootloader deploy unit
pub fn register(graph: &mut ProvisionGraph, paths: &AssetPaths) -> NodeId {
    let unit = DeployUnit::new("bootloader", paths.component("grub"))
        .with_trigger(RemoteCommand::new("update-grub"));
    graph.add_node("bootloader", Box::new(DeployStep::new(unit)) as _)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn paths() -> AssetPaths {
        AssetPaths {
            root: PathBuf::from("assets"),
            staging: None,
        }
    }

    #[test]
    fn registers_a_single_node() {
        let mut graph = ProvisionGraph::new();
        let id = register(&mut graph, &paths());
        assert_eq!(graph.name(id), "bootloader");
        assert_eq!(graph.len(), 1);
        assert!(graph.dependencies(id).is_empty());
    }
}

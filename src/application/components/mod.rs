//! Provisioning components
//!
//! One module per component. Each consumes its section of the typed
//! configuration and registers steps plus explicit dependency edges into
//! the task graph; nothing here talks to the remote host directly.

pub mod acme;
pub mod api_token;
pub mod backup;
pub mod grub;
pub mod prometheus;
pub mod python;
pub mod smtp;

use std::path::PathBuf;

use crate::application::ProvisionGraph;
use crate::config::Config;
use crate::error::HostsmithResult;

/// Asset locations shared by every component
pub struct AssetPaths {
    /// Root of the template tree
    pub root: PathBuf,
    /// Optional local staging directory
    pub staging: Option<PathBuf>,
}

impl AssetPaths {
    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.assets.clone(),
            staging: config.staging.clone(),
        }
    }

    /// Asset subdirectory for one component
    pub fn component(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// Build the full task graph for a configuration
///
/// Components are registered in a fixed order; ordering between steps is
/// carried only by the explicit edges each component declares.
pub fn build_graph(config: &Config) -> HostsmithResult<ProvisionGraph> {
    let mut graph = ProvisionGraph::new();
    let paths = AssetPaths::from_config(config);

    if let Some(cfg) = &config.interpreter {
        python::register(&mut graph, cfg)?;
    }
    if config.bootloader.is_some() {
        grub::register(&mut graph, &paths);
    }
    if let Some(cfg) = &config.smtp {
        smtp::register(&mut graph, cfg, &paths);
    }
    if let Some(cfg) = &config.acme {
        acme::register(&mut graph, cfg);
    }
    if let Some(cfg) = &config.backup {
        backup::register(&mut graph, cfg, &paths);
    }
    if let Some(cfg) = &config.metrics {
        prometheus::register(&mut graph, cfg, &paths);
    }
    if let Some(cfg) = &config.api_token {
        api_token::register(&mut graph, cfg);
    }

    Ok(graph)
}

//! DeployUnit entity - one config-file deployment
//!
//! The aggregate of a template set, an optional configuration mapping, an
//! optional staging directory, and an optional post-run trigger. Planning
//! and execution live in the planner service and the deploy step; this is
//! the pure description.

use std::path::{Path, PathBuf};

use crate::domain::value_objects::{ConfigMap, RemoteCommand};

/// Default filename pattern for template discovery
pub const DEFAULT_PATTERN: &str = "*.cfg";

/// Description of one config-file deployment unit
#[derive(Debug, Clone)]
pub struct DeployUnit {
    /// Logical name, merged into the mapping as the synthetic `name` key
    name: String,
    /// Local directory holding the template files
    asset_dir: PathBuf,
    /// Filename patterns selecting templates under the asset directory
    patterns: Vec<String>,
    /// Mapping substituted into templates; `None` uploads files verbatim
    mapping: Option<ConfigMap>,
    /// Local directory for content-addressed staging slots
    staging_dir: Option<PathBuf>,
    /// Command run on the remote host after all uploads succeed
    trigger: Option<RemoteCommand>,
}

impl DeployUnit {
    pub fn new(name: impl Into<String>, asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            asset_dir: asset_dir.into(),
            patterns: vec![DEFAULT_PATTERN.to_string()],
            mapping: None,
            staging_dir: None,
            trigger: None,
        }
    }

    pub fn with_mapping(mut self, mapping: ConfigMap) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn with_patterns(mut self, patterns: &[&str]) -> Self {
        self.patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn with_trigger(mut self, trigger: RemoteCommand) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn mapping(&self) -> Option<&ConfigMap> {
        self.mapping.as_ref()
    }

    pub fn staging_dir(&self) -> Option<&Path> {
        self.staging_dir.as_deref()
    }

    pub fn trigger(&self) -> Option<&RemoteCommand> {
        self.trigger.as_ref()
    }

    /// Mapping extended with the synthetic `name` key, if any mapping is set
    pub fn merged_mapping(&self) -> Option<ConfigMap> {
        self.mapping.as_ref().map(|m| m.merged_with_name(&self.name))
    }
}

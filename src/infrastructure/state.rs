//! TOML state repository
//!
//! Persists the state file next to the configuration. A missing or
//! unparseable file yields a fresh state, so a deleted state file simply
//! means every step is applied again.

use std::fs;
use std::path::Path;

use crate::domain::entities::StateFile;
use crate::domain::ports::StateRepository;
use crate::error::HostsmithResult;

/// State repository backed by a TOML file
#[derive(Default)]
pub struct TomlStateRepository;

impl TomlStateRepository {
    pub fn new() -> Self {
        Self
    }
}

impl StateRepository for TomlStateRepository {
    fn load_or_new(&self, path: &Path) -> StateFile {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn save(&self, path: &Path, state: &StateFile) -> HostsmithResult<()> {
        let content = toml::to_string_pretty(state)?;
        fs::write(path, content)?;
        Ok(())
    }
}

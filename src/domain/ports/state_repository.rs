//! State Repository Port
//!
//! Loads and persists the state file. Kept behind a trait so the apply
//! pipeline can be tested without touching disk.

use std::path::Path;

use crate::domain::entities::StateFile;
use crate::error::HostsmithResult;

/// Trait for state file persistence
pub trait StateRepository {
    /// Load the state file, or start fresh when it is absent or unreadable
    fn load_or_new(&self, path: &Path) -> StateFile;

    /// Persist the state file
    fn save(&self, path: &Path, state: &StateFile) -> HostsmithResult<()>;
}

//! Asset discovery
//!
//! Recursive scan of a local asset directory for template files matching a
//! unit's filename patterns. Results are sorted by relative path so planning
//! and staging are deterministic; upload order carries no semantics.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{HostsmithError, HostsmithResult};

/// One discovered template file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    /// Absolute (or caller-relative) path on the local filesystem
    pub path: PathBuf,
    /// Path relative to the asset directory
    pub relative: PathBuf,
}

/// Whether a filename matches a `*.<ext>`-style pattern
///
/// Only a single leading `*` wildcard is supported; anything else is an
/// exact filename match.
fn matches_pattern(file_name: &str, pattern: &str) -> bool {
    match pattern.strip_prefix('*') {
        Some(suffix) => file_name.ends_with(suffix),
        None => file_name == pattern,
    }
}

/// Enumerate all files under `asset_dir` matching any of `patterns`
pub fn discover_assets(asset_dir: &Path, patterns: &[String]) -> HostsmithResult<Vec<AssetFile>> {
    if !asset_dir.is_dir() {
        return Err(HostsmithError::AssetDirectoryNotFound {
            path: asset_dir.to_path_buf(),
        });
    }

    let mut found = Vec::new();
    let walker = WalkBuilder::new(asset_dir)
        .standard_filters(false)
        .hidden(false)
        .build();

    for entry in walker {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        let path = entry.path();
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !patterns.iter().any(|p| matches_pattern(file_name, p)) {
            continue;
        }
        let relative = path
            .strip_prefix(asset_dir)
            .expect("walker yields paths under the asset dir")
            .to_path_buf();
        found.push(AssetFile {
            path: path.to_path_buf(),
            relative,
        });
    }

    found.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(found)
}

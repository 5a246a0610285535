//! Deployment unit planning
//!
//! Renders every template in a unit, derives remote paths, validates
//! uniqueness before anything is uploaded, and classifies each artifact as
//! changed or unchanged against recorded state. The plan is the unit's
//! single source of truth for both the `plan` preview and the actual apply.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::entities::{DeployUnit, RenderedFile, StateFile};
use crate::domain::services::discovery::{discover_assets, AssetFile};
use crate::domain::services::template::render;
use crate::domain::value_objects::{ContentHash, RemotePath};
use crate::error::{HostsmithError, HostsmithResult};

/// One artifact the unit would place on the remote host
#[derive(Debug, Clone)]
pub struct PlannedUpload {
    /// Local template path, for error context and staging
    pub source: PathBuf,
    /// Path relative to the asset directory
    pub relative: PathBuf,
    /// Rendered artifact
    pub file: RenderedFile,
    /// Whether recorded state differs from the rendered content
    pub changed: bool,
}

/// The computed plan for one deployment unit
#[derive(Debug, Clone)]
pub struct UnitPlan {
    /// Every discovered artifact, sorted by remote path
    pub uploads: Vec<PlannedUpload>,
    /// Whether the post-run trigger would execute
    pub trigger_due: bool,
    /// Fingerprint over all (remote path, content hash) pairs and the
    /// trigger line; recorded as the unit's step state after success
    pub fingerprint: ContentHash,
}

impl UnitPlan {
    /// Remote paths of every artifact, in stable order
    pub fn remote_paths(&self) -> Vec<String> {
        self.uploads
            .iter()
            .map(|u| u.file.remote_path().as_str().to_string())
            .collect()
    }

    pub fn changed_count(&self) -> usize {
        self.uploads.iter().filter(|u| u.changed).count()
    }

    pub fn has_changes(&self) -> bool {
        self.changed_count() > 0 || self.trigger_due
    }
}

/// Content-addressed staging slot for a template's relative path
///
/// Repeated runs reuse the same slot instead of accumulating files.
pub fn staging_slot(relative: &Path) -> String {
    let posix = RemotePath::from_relative(relative);
    let hash = ContentHash::from_content(posix.as_str());
    format!("file-{}", hash.hex())
}

/// Plan one deployment unit against recorded state
pub fn plan_unit(unit: &DeployUnit, state: &StateFile) -> HostsmithResult<UnitPlan> {
    let assets = discover_assets(unit.asset_dir(), unit.patterns())?;
    plan_assets(unit, assets, state)
}

/// Plan a unit over an already-discovered asset list
pub fn plan_assets(
    unit: &DeployUnit,
    assets: Vec<AssetFile>,
    state: &StateFile,
) -> HostsmithResult<UnitPlan> {
    let mapping = unit.merged_mapping();

    let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut uploads = Vec::with_capacity(assets.len());

    for asset in assets {
        let remote_path = RemotePath::from_relative(&asset.relative);

        if let Some(first) = seen.get(remote_path.as_str()) {
            return Err(HostsmithError::DuplicateRemotePath {
                path: remote_path.as_str().to_string(),
                first: first.clone(),
                second: asset.relative.clone(),
            });
        }
        seen.insert(remote_path.as_str().to_string(), asset.relative.clone());

        let file = match &mapping {
            Some(values) => {
                let template = fs::read_to_string(&asset.path)?;
                let rendered = render(&template, values, &asset.relative)?;
                RenderedFile::new(
                    remote_path.clone(),
                    rendered.text.into_bytes(),
                    rendered.used_secret,
                )
            }
            None => {
                let content = fs::read(&asset.path)?;
                RenderedFile::new(remote_path.clone(), content, false)
            }
        };

        let changed = !state.file_matches(remote_path.as_str(), &file.content_hash());
        uploads.push(PlannedUpload {
            source: asset.path,
            relative: asset.relative,
            file,
            changed,
        });
    }

    uploads.sort_by(|a, b| a.file.remote_path().cmp(b.file.remote_path()));

    let fingerprint = unit_fingerprint(unit, &uploads);
    let trigger_due = unit.trigger().is_some() && !state.step_matches(unit.name(), &fingerprint);

    Ok(UnitPlan {
        uploads,
        trigger_due,
        fingerprint,
    })
}

/// Hash over remote paths, content hashes, and the trigger line
fn unit_fingerprint(unit: &DeployUnit, uploads: &[PlannedUpload]) -> ContentHash {
    let mut material = String::new();
    for upload in uploads {
        material.push_str(upload.file.remote_path().as_str());
        material.push('\0');
        material.push_str(upload.file.content_hash().as_str());
        material.push('\n');
    }
    if let Some(trigger) = unit.trigger() {
        material.push_str("trigger\0");
        material.push_str(&trigger.render());
    }
    ContentHash::from_content(&material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ConfigMap, RemoteCommand};
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn verbatim_unit_keeps_bytes_identical() {
        let dir = TempDir::new().unwrap();
        write(&dir, "etc/default/grub.d/90.cfg", "GRUB_TIMEOUT={not_a_key}\n");

        let unit = DeployUnit::new("bootloader", dir.path());
        let plan = plan_unit(&unit, &StateFile::new()).unwrap();

        assert_eq!(plan.uploads.len(), 1);
        assert_eq!(plan.uploads[0].file.content(), b"GRUB_TIMEOUT={not_a_key}\n");
    }

    #[test]
    fn mapped_unit_renders_with_synthetic_name() {
        let dir = TempDir::new().unwrap();
        write(&dir, "etc/app.cfg", "user={name}\n");

        let unit = DeployUnit::new("svc1", dir.path()).with_mapping(ConfigMap::new());
        let plan = plan_unit(&unit, &StateFile::new()).unwrap();

        assert_eq!(plan.uploads[0].file.content(), b"user=svc1\n");
        assert_eq!(plan.uploads[0].file.remote_path().as_str(), "/etc/app.cfg");
    }

    #[test]
    fn missing_key_fails_the_plan() {
        let dir = TempDir::new().unwrap();
        write(&dir, "etc/app.cfg", "server={server}\n");

        let unit = DeployUnit::new("svc1", dir.path()).with_mapping(ConfigMap::new());
        let err = plan_unit(&unit, &StateFile::new()).unwrap_err();
        assert!(matches!(
            err,
            HostsmithError::MissingTemplateKey { key, .. } if key == "server"
        ));
    }

    #[test]
    fn colliding_remote_paths_fail_validation() {
        let dir = TempDir::new().unwrap();
        write(&dir, "x.cfg", "one");

        // Two asset entries whose relative paths normalize to the same
        // remote path must be rejected before anything is uploaded.
        let assets = vec![
            AssetFile {
                path: dir.path().join("x.cfg"),
                relative: PathBuf::from("x.cfg"),
            },
            AssetFile {
                path: dir.path().join("x.cfg"),
                relative: PathBuf::from("./x.cfg"),
            },
        ];
        let unit = DeployUnit::new("u", dir.path());
        let err = plan_assets(&unit, assets, &StateFile::new()).unwrap_err();
        match err {
            HostsmithError::DuplicateRemotePath { path, first, second } => {
                assert_eq!(path, "/x.cfg");
                assert_eq!(first, PathBuf::from("x.cfg"));
                assert_eq!(second, PathBuf::from("./x.cfg"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn all_files_changed_on_first_plan() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.cfg", "a");
        write(&dir, "b.cfg", "b");

        let unit = DeployUnit::new("u", dir.path());
        let plan = plan_unit(&unit, &StateFile::new()).unwrap();
        assert_eq!(plan.changed_count(), 2);
    }

    #[test]
    fn recorded_state_marks_files_unchanged() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.cfg", "a-content");

        let unit = DeployUnit::new("u", dir.path());
        let mut state = StateFile::new();
        let first = plan_unit(&unit, &state).unwrap();
        state.set_file_hash("/a.cfg", &first.uploads[0].file.content_hash());
        state.set_step_fingerprint("u", &first.fingerprint);

        let second = plan_unit(&unit, &state).unwrap();
        assert_eq!(second.changed_count(), 0);
        assert!(!second.has_changes());
    }

    #[test]
    fn changing_one_value_changes_only_that_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.cfg", "static\n");
        write(&dir, "b.cfg", "target={target}\n");

        let mut mapping = ConfigMap::new();
        mapping.insert("target", "one");
        let unit = DeployUnit::new("u", dir.path()).with_mapping(mapping);

        let mut state = StateFile::new();
        let first = plan_unit(&unit, &state).unwrap();
        for upload in &first.uploads {
            state.set_file_hash(
                upload.file.remote_path().as_str(),
                &upload.file.content_hash(),
            );
        }
        state.set_step_fingerprint("u", &first.fingerprint);

        let mut mapping = ConfigMap::new();
        mapping.insert("target", "two");
        let unit = DeployUnit::new("u", dir.path()).with_mapping(mapping);
        let second = plan_unit(&unit, &state).unwrap();

        let changed: Vec<_> = second
            .uploads
            .iter()
            .filter(|u| u.changed)
            .map(|u| u.file.remote_path().as_str().to_string())
            .collect();
        assert_eq!(changed, vec!["/b.cfg".to_string()]);
    }

    #[test]
    fn trigger_due_on_first_plan_and_after_content_change() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.cfg", "v1");

        let unit =
            DeployUnit::new("u", dir.path()).with_trigger(RemoteCommand::new("update-grub"));
        let mut state = StateFile::new();

        let first = plan_unit(&unit, &state).unwrap();
        assert!(first.trigger_due);

        state.set_file_hash("/a.cfg", &first.uploads[0].file.content_hash());
        state.set_step_fingerprint("u", &first.fingerprint);
        let second = plan_unit(&unit, &state).unwrap();
        assert!(!second.trigger_due);

        write(&dir, "a.cfg", "v2");
        let third = plan_unit(&unit, &state).unwrap();
        assert!(third.trigger_due);
    }

    #[test]
    fn trigger_line_change_retriggers_without_content_change() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.cfg", "same");

        let unit = DeployUnit::new("u", dir.path())
            .with_trigger(RemoteCommand::new("systemctl").arg("reload").value("a"));
        let mut state = StateFile::new();
        let first = plan_unit(&unit, &state).unwrap();
        state.set_file_hash("/a.cfg", &first.uploads[0].file.content_hash());
        state.set_step_fingerprint("u", &first.fingerprint);

        let unit = DeployUnit::new("u", dir.path())
            .with_trigger(RemoteCommand::new("systemctl").arg("restart").value("a"));
        let second = plan_unit(&unit, &state).unwrap();
        assert_eq!(second.changed_count(), 0);
        assert!(second.trigger_due);
    }

    #[test]
    fn staging_slot_is_deterministic_and_path_addressed() {
        let a = staging_slot(Path::new("etc/app.cfg"));
        let b = staging_slot(Path::new("etc/app.cfg"));
        let c = staging_slot(Path::new("etc/other.cfg"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("file-"));
    }

    #[test]
    fn missing_asset_dir_propagates() {
        let unit = DeployUnit::new("u", "/does/not/exist");
        let err = plan_unit(&unit, &StateFile::new()).unwrap_err();
        assert!(matches!(err, HostsmithError::AssetDirectoryNotFound { .. }));
    }
}

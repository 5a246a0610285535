//! Outbound mail relay configuration
//!
//! Renders the SMTP asset folder with the relay credentials. The password
//! flows through as a secret, so any template embedding it produces a
//! sensitive artifact.

use crate::application::deployer::DeployStep;
use crate::application::ProvisionGraph;
use crate::config::SmtpConfig;
use crate::domain::entities::DeployUnit;
use crate::domain::services::NodeId;
use crate::domain::value_objects::ConfigMap;

use super::AssetPaths;

fn mapping(cfg: &SmtpConfig) -> ConfigMap {
    let mut map = ConfigMap::new();
    map.insert("server", &cfg.server);
    map.insert("port", cfg.port.to_string());
    map.insert("username", &cfg.username);
    map.insert_secret("password", &cfg.password);
    map.insert("from", &cfg.from);
    map
}

/// Register the mail relay deploy unit
pub fn register(graph: &mut ProvisionGraph, cfg: &SmtpConfig, paths: &AssetPaths) -> NodeId {
    let mut unit =
        DeployUnit::new("smtp-relay", paths.component("smtp")).with_mapping(mapping(cfg));
    if let Some(staging) = &paths.staging {
        unit = unit.with_staging_dir(staging);
    }
    graph.add_node("smtp-relay", Box::new(DeployStep::new(unit)) as _)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::SecretString;

    fn cfg() -> SmtpConfig {
        SmtpConfig {
            server: "smtp.example.org".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: SecretString::new("hunter2"),
            from: "pve@example.org".to_string(),
        }
    }

    #[test]
    fn mapping_carries_all_template_keys() {
        let map = mapping(&cfg());
        for key in ["server", "port", "username", "password", "from"] {
            assert!(map.contains_key(key), "missing key {key}");
        }
        assert_eq!(map.get("port").unwrap().as_str(), "587");
    }

    #[test]
    fn password_is_the_only_secret() {
        let map = mapping(&cfg());
        assert!(map.get("password").unwrap().is_secret());
        assert!(!map.get("username").unwrap().is_secret());
    }
}

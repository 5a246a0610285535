//! Configuration module for Hostsmith
//!
//! Loads `hostsmith.toml`: a `[connection]` table plus one table per
//! provisioning component. A component is enabled by the presence of its
//! table; absent tables register nothing. Secret-valued fields deserialize
//! into [`SecretString`] so they cannot leak through debug output.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::value_objects::SecretString;
use crate::error::{HostsmithError, HostsmithResult};

/// Default configuration filename
pub const CONFIG_FILE: &str = "hostsmith.toml";

/// Default state filename, written next to the configuration
pub const STATE_FILE: &str = "hostsmith.lock";

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

/// SSH connection parameters for the target host
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Hostname or address of the virtualization host
    pub host: String,
    /// Remote user, typically root
    pub user: String,
    /// Path to the SSH private key
    pub private_key: Option<PathBuf>,
}

/// Source-built interpreter install
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InterpreterConfig {
    /// Full version to build, e.g. "3.12.4"
    pub version: String,
}

/// Bootloader configuration deploy; the table's presence enables it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BootloaderConfig {}

/// Outbound mail relay credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Sender address for host notifications
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AcmeAccountConfig {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AcmePluginData {
    pub key: String,
    pub value: SecretString,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AcmePluginConfig {
    pub name: String,
    /// DNS provider identifier understood by the host's ACME client
    pub api: String,
    /// Provider credentials, written to a remote scratch file during setup
    #[serde(default)]
    pub data: Vec<AcmePluginData>,
}

/// TLS certificate issuance
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AcmeConfig {
    /// Order against the staging directory instead of production
    #[serde(default)]
    pub staging: bool,
    pub domain: String,
    pub account: AcmeAccountConfig,
    pub plugin: AcmePluginConfig,
}

/// Backup storage and scheduled jobs
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BackupConfig {
    /// Block device or dataset to mount
    pub filesystem: String,
    pub mountpoint: String,
    /// Storage identifier registered on the host
    pub storage: String,
    /// Job schedule in the host's calendar syntax
    pub schedule: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExporterConfig {
    /// Service account for the metrics exporter
    pub username: String,
    pub password: SecretString,
    /// Container id of the metrics server on this host
    pub vmid: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ScrapeConfig {
    /// host:port the metrics server scrapes
    pub target: String,
    /// Remote-write endpoint
    pub remote_url: String,
    pub remote_username: String,
    pub remote_password: SecretString,
}

/// Metrics exporter install and scrape-target configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MetricsConfig {
    pub exporter: ExporterConfig,
    pub local: ScrapeConfig,
}

/// API token creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ApiTokenConfig {
    pub username: String,
    pub name: String,
}

/// Root configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub connection: ConnectionConfig,

    /// Root of the template asset tree
    #[serde(default = "default_assets_dir")]
    pub assets: PathBuf,

    /// Local directory for content-addressed staging slots
    #[serde(default)]
    pub staging: Option<PathBuf>,

    #[serde(default)]
    pub interpreter: Option<InterpreterConfig>,
    #[serde(default)]
    pub bootloader: Option<BootloaderConfig>,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    #[serde(default)]
    pub acme: Option<AcmeConfig>,
    #[serde(default)]
    pub backup: Option<BackupConfig>,
    #[serde(default)]
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub api_token: Option<ApiTokenConfig>,
}

impl Config {
    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> HostsmithResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> HostsmithResult<Self> {
        if !path.is_file() {
            return Err(HostsmithError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;

        // Paths in the file are relative to the file's directory.
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.rooted_at(base))
    }

    /// Resolve relative paths against a base directory
    fn rooted_at(mut self, base: &Path) -> Self {
        if self.assets.is_relative() {
            self.assets = base.join(&self.assets);
        }
        if let Some(staging) = &self.staging {
            if staging.is_relative() {
                self.staging = Some(base.join(staging));
            }
        }
        self
    }

    /// State file path next to the configuration file
    pub fn state_path(config_path: &Path) -> PathBuf {
        config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(STATE_FILE)
    }

    /// Names of the components this configuration enables
    pub fn enabled_components(&self) -> Vec<&'static str> {
        let mut enabled = Vec::new();
        if self.interpreter.is_some() {
            enabled.push("interpreter");
        }
        if self.bootloader.is_some() {
            enabled.push("bootloader");
        }
        if self.smtp.is_some() {
            enabled.push("smtp");
        }
        if self.acme.is_some() {
            enabled.push("acme");
        }
        if self.backup.is_some() {
            enabled.push("backup");
        }
        if self.metrics.is_some() {
            enabled.push("metrics");
        }
        if self.api_token.is_some() {
            enabled.push("api-token");
        }
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[connection]
host = "pve.example.org"
user = "root"
"#;

    #[test]
    fn minimal_config_parses() {
        let config = Config::from_toml(MINIMAL).unwrap();
        assert_eq!(config.connection.host, "pve.example.org");
        assert_eq!(config.connection.user, "root");
        assert!(config.connection.private_key.is_none());
        assert_eq!(config.assets, PathBuf::from("assets"));
        assert!(config.enabled_components().is_empty());
    }

    #[test]
    fn empty_bootloader_table_enables_component() {
        let toml = format!("{}\n[bootloader]\n", MINIMAL);
        let config = Config::from_toml(&toml).unwrap();
        assert!(config.bootloader.is_some());
        assert_eq!(config.enabled_components(), vec!["bootloader"]);
    }

    #[test]
    fn smtp_password_is_secret() {
        let toml = format!(
            r#"{}
[smtp]
server = "smtp.example.org"
port = 587
username = "mailer"
password = "hunter2"
from = "pve@example.org"
"#,
            MINIMAL
        );
        let config = Config::from_toml(&toml).unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.password.expose(), "hunter2");
        assert!(!format!("{:?}", smtp).contains("hunter2"));
    }

    #[test]
    fn acme_defaults_to_production() {
        let toml = format!(
            r#"{}
[acme]
domain = "pve.example.org"

[acme.account]
name = "ops"
contact = "ops@example.org"

[acme.plugin]
name = "dns-main"
api = "hetzner"
"#,
            MINIMAL
        );
        let config = Config::from_toml(&toml).unwrap();
        let acme = config.acme.unwrap();
        assert!(!acme.staging);
        assert!(acme.plugin.data.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = format!("{}\ntypo = true\n", MINIMAL);
        assert!(Config::from_toml(&toml).is_err());
    }

    #[test]
    fn missing_file_is_config_not_found() {
        let err = Config::load(Path::new("/nonexistent/hostsmith.toml")).unwrap_err();
        assert!(matches!(err, HostsmithError::ConfigNotFound { .. }));
    }

    #[test]
    fn load_roots_relative_paths_at_config_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), MINIMAL).unwrap();

        let config = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.assets, dir.path().join("assets"));
    }

    #[test]
    fn state_path_is_next_to_config() {
        let path = Config::state_path(Path::new("/srv/pve/hostsmith.toml"));
        assert_eq!(path, PathBuf::from("/srv/pve/hostsmith.lock"));
    }

    #[test]
    fn kebab_case_table_names() {
        let toml = format!(
            r#"{}
[api-token]
username = "root"
name = "automation"
"#,
            MINIMAL
        );
        let config = Config::from_toml(&toml).unwrap();
        assert_eq!(config.api_token.unwrap().name, "automation");
    }
}

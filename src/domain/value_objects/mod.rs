//! Domain Value Objects
//!
//! Small immutable types with validation and identity semantics.

pub mod config_map;
pub mod content_hash;
pub mod remote_command;
pub mod remote_path;
pub mod secret;

pub use config_map::{ConfigMap, ConfigValue};
pub use content_hash::ContentHash;
pub use remote_command::{shell_quote, RemoteCommand};
pub use remote_path::RemotePath;
pub use secret::SecretString;

//! Hostsmith - declarative provisioning for a single-node virtualization host
//!
//! Hostsmith turns a typed configuration file and a directory of template
//! assets into a dependency-ordered graph of provisioning steps, then applies
//! that graph to a remote host over SSH: config-file deployments with
//! post-run triggers, plus the shell command sequences that install and wire
//! up the host's services.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{build_graph, Applier, ApplyReport, DeployStep, RemoteCommand};
pub use config::Config;
pub use domain::entities::{DeployUnit, RenderedFile, StateFile};
pub use domain::ports::{
    CommandOutput, EventSink, NoopEventSink, ProvisionStep, RemoteChannel, RemoteError,
};
pub use domain::services::TaskGraph;
pub use domain::value_objects::{ConfigMap, ContentHash, RemotePath, SecretString};
pub use error::{HostsmithError, HostsmithResult};

//! Application layer
//!
//! Use cases built on the domain: the config-file deploy step, typed
//! command steps, the graph applier, and one module per provisioning
//! component.

pub mod apply;
pub mod command_step;
pub mod components;
pub mod deployer;

pub use apply::{Applier, ApplyReport, PlanReport, StepPreview};
pub use command_step::CommandStep;
pub use components::build_graph;
pub use deployer::DeployStep;

// Re-exported so callers can build commands without reaching into the
// domain module tree.
pub use crate::domain::value_objects::RemoteCommand;

use crate::domain::ports::ProvisionStep;
use crate::domain::services::TaskGraph;

/// The graph of provisioning steps the CLI builds and walks
pub type ProvisionGraph = TaskGraph<Box<dyn ProvisionStep>>;

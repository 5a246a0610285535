//! Domain Entities
//!
//! Aggregates with identity that flow through the provisioning pipeline.

pub mod deploy_unit;
pub mod rendered_file;
pub mod statefile;

pub use deploy_unit::DeployUnit;
pub use rendered_file::RenderedFile;
pub use statefile::StateFile;

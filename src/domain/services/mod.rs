//! Domain Services
//!
//! Stateless logic over entities and value objects: template rendering,
//! asset discovery, per-unit planning, and the task graph.

pub mod discovery;
pub mod graph;
pub mod planner;
pub mod template;

pub use discovery::{discover_assets, AssetFile};
pub use graph::{NodeId, TaskGraph};
pub use planner::{plan_assets, plan_unit, staging_slot, PlannedUpload, UnitPlan};
pub use template::{render, Rendered};

//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure provides the concrete implementations.

pub mod events;
pub mod remote_channel;
pub mod state_repository;
pub mod step;

pub use events::{ApplyEvent, EventSink, NoopEventSink};
pub use remote_channel::{CommandOutput, RemoteChannel, RemoteError};
pub use state_repository::StateRepository;
pub use step::{ExportedValue, ProvisionStep, StepContext, StepOutcome, StepPlan};

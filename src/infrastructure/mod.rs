//! Infrastructure layer
//!
//! Concrete implementations of the domain ports: the OpenSSH-backed remote
//! channel, the TOML state repository, and the event sinks.

pub mod events;
pub mod ssh;
pub mod state;

pub use events::{HumanEventSink, JsonEventSink};
pub use ssh::SshChannel;
pub use state::TomlStateRepository;

//! Application layer of the decoy engine.
//!
//! Wires the core domain into a concurrent service: a registry of
//! per-session trackers, the message-processing engine, and the periodic
//! sweep that drops expired sessions.

pub mod engine;
pub mod registry;
pub mod scheduler;

pub use engine::{ConversationEngine, ProcessOutcome};
pub use registry::{SharedTracker, TrackerRegistry};
pub use scheduler::{SweepScheduler, start_sweep_scheduler};

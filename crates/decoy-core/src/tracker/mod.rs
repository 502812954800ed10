//! Session tracking.
//!
//! # Module Structure
//!
//! - `model`: `SessionTracker`, the accumulating per-conversation state
//! - `message`: message senders and history entries
//! - `scoring`: weighted completeness scorer
//! - `frustration`: impatience/suspicion heuristic
//! - `threshold`: seedable per-session completeness threshold sampler

pub mod frustration;
mod message;
pub(crate) mod model;
pub mod scoring;
mod threshold;

pub use message::{HistoryEntry, Sender};
pub use model::{Progress, SessionTracker, TrackerSnapshot, TrackerStatus};
pub use scoring::completeness_score;
pub use threshold::ThresholdSampler;

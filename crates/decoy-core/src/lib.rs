//! Domain core of the decoy conversation engine.
//!
//! Holds everything that does not touch the network or the async runtime:
//! the per-session tracker, local pattern extraction, merging and scoring,
//! the termination rules, report synthesis and configuration.

pub mod callback;
pub mod clock;
pub mod config;
pub mod error;
pub mod intel;
pub mod report;
pub mod termination;
pub mod tracker;

pub use callback::{CallbackPayload, ExtractedIntelligence};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AdvisoryConfig, EngineConfig};
pub use error::{DecoyError, Result};
pub use intel::{ExtractedData, ExtractionCandidates, PatternExtractor, StructuredAnalysis};
pub use report::{Report, Severity};
pub use termination::{
    AdvisoryRequest, AdvisoryResponse, AdvisoryService, NoOpAdvisoryService, TerminationPolicy,
    TerminationReason,
};
pub use tracker::{
    HistoryEntry, Progress, SessionTracker, Sender, ThresholdSampler, TrackerSnapshot,
    TrackerStatus,
};

//! Termination decisions.
//!
//! # Module Structure
//!
//! - `reason`: the closed set of termination reasons
//! - `policy`: hard limits, advisory interpretation and the fallback rule
//! - `advisory`: the external advisory service contract

mod advisory;
mod policy;
mod reason;

pub use advisory::{
    AdvisoryRequest, AdvisoryResponse, AdvisoryService, AdvisoryStats, AdvisoryVerdict,
    NoOpAdvisoryService,
};
pub use policy::TerminationPolicy;
pub use reason::{TerminationReason, describe_reason_code};

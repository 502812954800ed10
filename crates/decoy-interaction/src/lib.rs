//! Network-facing collaborators of the decoy engine.
//!
//! Both services implement [`decoy_core::AdvisoryService`] and report every
//! failure as `DecoyError::Advisory`; the engine treats those as "no decision".

mod claude_advisory;
mod http_advisory;
pub mod prompt;

pub use claude_advisory::ClaudeAdvisoryAgent;
pub use http_advisory::HttpAdvisoryService;

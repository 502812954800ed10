//! Intelligence extraction domain module.
//!
//! # Module Structure
//!
//! - `model`: cumulative `ExtractedData` and per-batch `ExtractionCandidates`
//! - `extractor`: local regex/keyword `PatternExtractor`
//! - `analysis`: lenient `StructuredAnalysis` input from upstream classifiers
//! - `merger`: set-union merge with value normalization
//! - `lexicon`: keyword and pattern tables

mod analysis;
mod extractor;
pub mod lexicon;
mod merger;
mod model;

pub use analysis::{AnalysisExtraction, StructuredAnalysis};
pub use extractor::PatternExtractor;
pub use merger::normalize_label;
pub use model::{ExtractedData, ExtractionCandidates, IntelSource};

//! Counterparty frustration heuristic.

use crate::intel::lexicon::FRUSTRATION_MARKERS;

/// Upper bound of the frustration level.
pub const MAX_FRUSTRATION: u8 = 100;

/// Returns the impatience/suspicion markers present in `text`.
pub fn frustration_markers(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    FRUSTRATION_MARKERS
        .iter()
        .copied()
        .filter(|marker| lowered.contains(marker))
        .collect()
}

/// Applies one message to the current level.
///
/// A message raises the level by `step` at most once, however many markers
/// it carries; the level never decreases and saturates at 100.
pub fn next_frustration_level(current: u8, text: &str, step: u8) -> u8 {
    if frustration_markers(text).is_empty() {
        current
    } else {
        current.saturating_add(step).min(MAX_FRUSTRATION)
    }
}

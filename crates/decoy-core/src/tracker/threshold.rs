//! Per-session completeness threshold sampling.

use crate::config::{EngineConfig, MAX_COMPLETENESS_THRESHOLD, MIN_COMPLETENESS_THRESHOLD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Draws a jittered completeness threshold for each new session.
///
/// Seeding makes the sequence of thresholds reproducible; production code
/// seeds from OS entropy.
pub struct ThresholdSampler {
    base: u8,
    jitter: u8,
    rng: Mutex<StdRng>,
}

impl ThresholdSampler {
    pub fn seeded(base: u8, jitter: u8, seed: u64) -> Self {
        Self::with_rng(base, jitter, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(base: u8, jitter: u8) -> Self {
        Self::with_rng(base, jitter, StdRng::from_entropy())
    }

    /// Builds an entropy-seeded sampler from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::from_entropy(
            config.completeness_threshold_base,
            config.completeness_threshold_jitter,
        )
    }

    fn with_rng(base: u8, jitter: u8, rng: StdRng) -> Self {
        Self {
            base,
            jitter,
            rng: Mutex::new(rng),
        }
    }

    /// Returns `clamp(base + uniform[-jitter, jitter], 65, 85)`.
    pub fn sample(&self) -> u8 {
        let jitter = i16::from(self.jitter);
        let offset = if jitter == 0 {
            0
        } else {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.gen_range(-jitter..=jitter)
        };
        let value = (i16::from(self.base) + offset).clamp(
            i16::from(MIN_COMPLETENESS_THRESHOLD),
            i16::from(MAX_COMPLETENESS_THRESHOLD),
        );
        value as u8
    }
}

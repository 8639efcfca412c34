use crate::config::{SourceMode, SyntheticConfig};
use crate::error::SourceError;
use crate::events::Sample;
use crate::sources::SampleSource;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::pin::Pin;

/// Generates plausible sensor readings without any hardware
///
/// Normal readings are drawn uniformly from 60..=100 BPM. With probability
/// `abnormal_probability` the reading is replaced by a value from 40..=59 or
/// 101..=140 instead.
pub struct SyntheticSource {
    rng: StdRng,
    abnormal_probability: f64,
    finger_detected_probability: f64,
}

impl SyntheticSource {
    /// Create a generator seeded from the operating system
    pub fn new(config: &SyntheticConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a reproducible generator
    pub fn seeded(config: &SyntheticConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &SyntheticConfig, rng: StdRng) -> Self {
        Self {
            rng,
            abnormal_probability: config.abnormal_probability.clamp(0.0, 1.0),
            finger_detected_probability: config.finger_detected_probability.clamp(0.0, 1.0),
        }
    }

    /// Draw the next sample
    pub fn generate(&mut self) -> Sample {
        let mut current_bpm = self.rng.random_range(60..=100);
        if self.rng.random_bool(self.abnormal_probability) {
            current_bpm = if self.rng.random_bool(0.5) {
                self.rng.random_range(40..=59)
            } else {
                self.rng.random_range(101..=140)
            };
        }

        Sample {
            current_bpm,
            average_bpm: self.rng.random_range(65..=85),
            ir_value: self.rng.random_range(800..=1000),
            finger_detected: self.rng.random_bool(self.finger_detected_probability),
            captured_at: Utc::now(),
        }
    }
}

impl SampleSource for SyntheticSource {
    fn fetch<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Sample, SourceError>> + Send + 'a>> {
        let sample = self.generate();
        Box::pin(async move { Ok(sample) })
    }

    fn mode(&self) -> SourceMode {
        SourceMode::Synthetic
    }

    fn describe(&self) -> String {
        "synthetic data".to_string()
    }
}

//! Built-in insight rules
//!
//! Each rule looks at the statistics of the valid samples and contributes at
//! most one advisory message. Rules are independent of each other.

use crate::events::Severity;
use crate::insights::{HeartRateStats, Insight, InsightRule};

/// Classifies the average heart rate as low, high or normal
pub struct AverageRangeRule {
    /// Averages below this are reported as low
    pub low_bpm: f64,
    /// Averages above this are reported as high
    pub high_bpm: f64,
}

impl AverageRangeRule {
    /// Create a rule for the normal mean range
    ///
    /// # Arguments
    ///
    /// * `low_bpm` - Means below this note possible good fitness
    /// * `high_bpm` - Means above this advise consulting a provider
    pub fn new(low_bpm: f64, high_bpm: f64) -> Self {
        Self { low_bpm, high_bpm }
    }

    /// Create the default rule (below 60 low, above 100 high)
    pub fn with_defaults() -> Self {
        Self::new(60.0, 100.0)
    }
}

impl InsightRule for AverageRangeRule {
    fn evaluate(&self, stats: &HeartRateStats) -> Option<Insight> {
        let insight = if stats.mean < self.low_bpm {
            Insight::info("Low average heart rate - may indicate good cardiovascular fitness")
        } else if stats.mean > self.high_bpm {
            Insight::new(
                Severity::Warning,
                "High average heart rate - consider consulting a healthcare provider",
            )
        } else {
            Insight::info("Normal average heart rate - within healthy range")
        };
        Some(insight)
    }

    fn name(&self) -> &str {
        "AverageRangeRule"
    }
}

/// Reports whether the heart rate is steady or fluctuating
pub struct VariabilityRule {
    /// Standard deviations above this count as high variability
    pub std_dev_threshold: f64,
}

impl VariabilityRule {
    /// Create a rule flagging a standard deviation above `std_dev_threshold`
    pub fn new(std_dev_threshold: f64) -> Self {
        Self { std_dev_threshold }
    }

    /// Rule with the 15 BPM threshold
    pub fn with_defaults() -> Self {
        Self::new(15.0)
    }
}

impl InsightRule for VariabilityRule {
    fn evaluate(&self, stats: &HeartRateStats) -> Option<Insight> {
        let insight = if stats.std_dev > self.std_dev_threshold {
            Insight::info(
                "High heart rate variability - may indicate stress or changing activity levels",
            )
        } else {
            Insight::info("Stable heart rate pattern - consistent activity or rest state")
        };
        Some(insight)
    }

    fn name(&self) -> &str {
        "VariabilityRule"
    }
}

/// Warns when any reading exceeds a ceiling
pub struct PeakRule {
    pub max_bpm: u32,
}

impl PeakRule {
    /// Create a rule warning when any reading exceeds `max_bpm`
    pub fn new(max_bpm: u32) -> Self {
        Self { max_bpm }
    }

    /// Rule with the 120 BPM threshold
    pub fn with_defaults() -> Self {
        Self::new(120)
    }
}

impl InsightRule for PeakRule {
    fn evaluate(&self, stats: &HeartRateStats) -> Option<Insight> {
        (stats.max > self.max_bpm).then(|| {
            Insight::new(
                Severity::Warning,
                "⚠️ Warning: Detected very high heart rate values",
            )
        })
    }

    fn name(&self) -> &str {
        "PeakRule"
    }
}

/// Warns when any reading falls below a floor
pub struct TroughRule {
    pub min_bpm: u32,
}

impl TroughRule {
    /// Create a rule warning when any reading falls below `min_bpm`
    pub fn new(min_bpm: u32) -> Self {
        Self { min_bpm }
    }

    /// Rule with the 50 BPM threshold
    pub fn with_defaults() -> Self {
        Self::new(50)
    }
}

impl InsightRule for TroughRule {
    fn evaluate(&self, stats: &HeartRateStats) -> Option<Insight> {
        (stats.min < self.min_bpm).then(|| {
            Insight::new(
                Severity::Warning,
                "⚠️ Warning: Detected very low heart rate values",
            )
        })
    }

    fn name(&self) -> &str {
        "TroughRule"
    }
}

//! Bounded sample history with status and trend classification
//!
//! This module provides the HistoryBuffer which keeps the most recent samples in
//! insertion order and derives the current status and short-term trend from its tail.

use crate::events::Sample;
use std::collections::VecDeque;
use std::fmt;

/// Heart rate below this is classified as low
pub const LOW_BPM_THRESHOLD: u32 = 60;

/// Heart rate above this is classified as high
pub const HIGH_BPM_THRESHOLD: u32 = 100;

/// Number of trailing samples considered for the trend
pub const TREND_WINDOW: usize = 5;

/// Change in BPM across the trend window that counts as movement
pub const TREND_DELTA_BPM: i64 = 5;

/// Categorical status of the latest sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    NoData,
    NoFingerDetected,
    Measuring,
    LowHeartRate,
    HighHeartRate,
    Normal,
}

impl Status {
    /// Human-readable label shown in the panel and the report
    pub fn label(&self) -> &'static str {
        match self {
            Status::NoData => "No data",
            Status::NoFingerDetected => "No finger detected",
            Status::Measuring => "Measuring",
            Status::LowHeartRate => "Low heart rate",
            Status::HighHeartRate => "High heart rate",
            Status::Normal => "Normal",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Short-term direction of the heart rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    NoTrendData,
    InsufficientData,
    Rising,
    Falling,
    Stable,
}

impl Trend {
    /// Human-readable label shown in the panel and the report
    pub fn label(&self) -> &'static str {
        match self {
            Trend::NoTrendData => "No trend data",
            Trend::InsufficientData => "Insufficient data",
            Trend::Rising => "Rising",
            Trend::Falling => "Falling",
            Trend::Stable => "Stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bounded FIFO of recent samples
///
/// Holds at most `capacity` samples. When a new sample would exceed the
/// capacity, the oldest samples are evicted first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` samples
    ///
    /// A capacity of 0 is raised to 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulsewatch::aggregator::HistoryBuffer;
    ///
    /// let history = HistoryBuffer::new(100);
    /// assert!(history.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest ones if over capacity
    pub fn record(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        self.enforce_capacity();
    }

    /// Change the capacity; excess samples are evicted immediately
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.enforce_capacity();
    }

    /// Drop every stored sample
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Maximum number of samples kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recently recorded sample
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// BPM values of all valid samples, oldest first
    pub fn valid_bpms(&self) -> Vec<u32> {
        self.samples
            .iter()
            .filter(|sample| sample.is_valid())
            .map(|sample| sample.current_bpm)
            .collect()
    }

    /// Raw BPM values of the last `count` samples, oldest first
    pub fn recent_bpms(&self, count: usize) -> Vec<u32> {
        let skip = self.samples.len().saturating_sub(count);
        self.samples
            .iter()
            .skip(skip)
            .map(|sample| sample.current_bpm)
            .collect()
    }

    /// Classify the latest sample
    pub fn current_status(&self) -> Status {
        let Some(latest) = self.samples.back() else {
            return Status::NoData;
        };

        if !latest.finger_detected {
            Status::NoFingerDetected
        } else if latest.current_bpm == 0 {
            Status::Measuring
        } else if latest.current_bpm < LOW_BPM_THRESHOLD {
            Status::LowHeartRate
        } else if latest.current_bpm > HIGH_BPM_THRESHOLD {
            Status::HighHeartRate
        } else {
            Status::Normal
        }
    }

    /// Direction of the heart rate over the last few valid samples
    ///
    /// Compares the newest valid BPM in the trailing window against the
    /// oldest valid BPM in that same window.
    pub fn trend(&self) -> Trend {
        if self.samples.len() < 2 {
            return Trend::NoTrendData;
        }

        let recent: Vec<i64> = self
            .samples
            .iter()
            .skip(self.samples.len().saturating_sub(TREND_WINDOW))
            .filter(|sample| sample.is_valid())
            .map(|sample| i64::from(sample.current_bpm))
            .collect();

        if recent.len() < 2 {
            return Trend::InsufficientData;
        }

        let first = recent[0];
        let last = recent[recent.len() - 1];
        if last > first + TREND_DELTA_BPM {
            Trend::Rising
        } else if last < first - TREND_DELTA_BPM {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }

    fn enforce_capacity(&mut self) {
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn sample(bpm: u32, finger_detected: bool) -> Sample {
        Sample {
            current_bpm: bpm,
            average_bpm: 75,
            ir_value: 900,
            finger_detected,
            captured_at: Utc::now(),
        }
    }

    fn history_of(bpms: &[u32]) -> HistoryBuffer {
        let mut history = HistoryBuffer::new(100);
        for &bpm in bpms {
            history.record(sample(bpm, true));
        }
        history
    }

    #[test]
    fn test_record_and_latest() {
        let mut history = HistoryBuffer::new(10);
        history.record(sample(70, true));
        history.record(sample(80, true));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().current_bpm, 80);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let history = {
            let mut history = HistoryBuffer::new(3);
            for bpm in [61, 62, 63, 64, 65] {
                history.record(sample(bpm, true));
            }
            history
        };

        assert_eq!(history.len(), 3);
        assert_eq!(history.recent_bpms(10), vec![63, 64, 65]);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut history = HistoryBuffer::new(0);
        history.record(sample(70, true));
        history.record(sample(71, true));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.recent_bpms(5), vec![71]);
    }

    #[test]
    fn test_shrinking_capacity_evicts_immediately() {
        let mut history = history_of(&[60, 61, 62, 63, 64, 65]);
        history.set_capacity(2);
        assert_eq!(history.recent_bpms(10), vec![64, 65]);
    }

    #[test]
    fn test_reset_clears() {
        let mut history = history_of(&[70, 71]);
        history.reset();
        assert!(history.is_empty());
        assert_eq!(history.current_status(), Status::NoData);
    }

    #[test]
    fn test_valid_bpms_skips_placeholders() {
        let history = history_of(&[0, 72, 0, 80]);
        assert_eq!(history.valid_bpms(), vec![72, 80]);
    }

    #[test]
    fn test_status_classification() {
        let mut history = HistoryBuffer::new(10);
        assert_eq!(history.current_status(), Status::NoData);

        history.record(sample(0, true));
        assert_eq!(history.current_status(), Status::Measuring);

        history.record(sample(55, true));
        assert_eq!(history.current_status(), Status::LowHeartRate);

        history.record(sample(60, true));
        assert_eq!(history.current_status(), Status::Normal);

        history.record(sample(100, true));
        assert_eq!(history.current_status(), Status::Normal);

        history.record(sample(101, true));
        assert_eq!(history.current_status(), Status::HighHeartRate);

        history.record(sample(101, false));
        assert_eq!(history.current_status(), Status::NoFingerDetected);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(Status::NoData.to_string(), "No data");
        assert_eq!(Status::NoFingerDetected.to_string(), "No finger detected");
        assert_eq!(Status::HighHeartRate.to_string(), "High heart rate");
        assert_eq!(Trend::NoTrendData.to_string(), "No trend data");
        assert_eq!(Trend::InsufficientData.to_string(), "Insufficient data");
    }

    #[test]
    fn test_trend_needs_two_samples() {
        assert_eq!(history_of(&[]).trend(), Trend::NoTrendData);
        assert_eq!(history_of(&[80]).trend(), Trend::NoTrendData);
    }

    #[test]
    fn test_trend_needs_two_valid_samples() {
        assert_eq!(history_of(&[0, 0, 0, 90]).trend(), Trend::InsufficientData);
        assert_eq!(history_of(&[0, 0]).trend(), Trend::InsufficientData);
    }

    #[test]
    fn test_trend_directions() {
        assert_eq!(history_of(&[72, 75, 78, 95, 130]).trend(), Trend::Rising);
        assert_eq!(history_of(&[90, 88, 86, 84]).trend(), Trend::Falling);
        assert_eq!(history_of(&[70, 90, 50, 75]).trend(), Trend::Stable);
        assert_eq!(history_of(&[70, 75]).trend(), Trend::Stable);
        assert_eq!(history_of(&[70, 76]).trend(), Trend::Rising);
        assert_eq!(history_of(&[70, 64]).trend(), Trend::Falling);
    }

    #[test]
    fn test_trend_only_looks_at_last_five() {
        // 40 falls out of the window; 60 -> 62 is stable
        let history = history_of(&[40, 60, 0, 61, 0, 62]);
        assert_eq!(history.trend(), Trend::Stable);
    }
}

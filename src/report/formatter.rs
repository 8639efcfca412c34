//! Text report rendering
//!
//! Renders the current sample, status, trend, statistics and insights into the
//! message that is pushed to the chat bot.

use crate::aggregator::{HistoryBuffer, Status, Trend};
use crate::events::Sample;
use crate::insights::{HeartRateStats, Insight, InsightEngine};
use crate::report::{Clock, SystemClock};
use std::fmt::Write;

/// Text returned when there is no sample to report on
pub const NO_DATA_REPORT: &str = "No data available for report";

/// Everything a report is rendered from, captured at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSnapshot {
    pub latest: Option<Sample>,
    pub status: Status,
    pub trend: Trend,
    /// Statistics over the valid samples, if there are any
    pub stats: Option<HeartRateStats>,
    pub insights: Vec<Insight>,
    pub patient_name: Option<String>,
}

impl ReportSnapshot {
    /// Capture the current state of a history buffer
    pub fn capture(
        history: &HistoryBuffer,
        engine: &InsightEngine,
        patient_name: Option<&str>,
    ) -> Self {
        let valid_bpms = history.valid_bpms();
        Self {
            latest: history.latest().cloned(),
            status: history.current_status(),
            trend: history.trend(),
            stats: HeartRateStats::from_values(&valid_bpms),
            insights: engine.generate(&valid_bpms),
            patient_name: patient_name.map(str::to_string),
        }
    }
}

/// Renders report snapshots as text
pub struct ReportFormatter<C: Clock = SystemClock> {
    clock: C,
}

impl Default for ReportFormatter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter<SystemClock> {
    /// Create a formatter stamping reports with the local wall clock
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> ReportFormatter<C> {
    /// Create a formatter that stamps reports with the given clock
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Render a snapshot as a report
    ///
    /// The output depends only on the snapshot and the clock reading.
    pub fn format(&self, snapshot: &ReportSnapshot) -> String {
        let Some(latest) = &snapshot.latest else {
            return NO_DATA_REPORT.to_string();
        };

        let mut message = String::new();

        message.push_str("❤️ HEART RATE STATUS REPORT ❤️\n\n");
        let patient = snapshot
            .patient_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("Not specified");
        let _ = writeln!(message, "👤 Patient: {}", patient);
        let _ = writeln!(message, "📊 Current Status: {}", snapshot.status);
        let _ = writeln!(message, "📈 Trend: {}\n", snapshot.trend);

        message.push_str("🔢 CURRENT METRICS:\n");
        let _ = writeln!(message, "• Heart Rate: {} BPM", or_na(latest.current_bpm));
        let _ = writeln!(message, "• Average HR: {} BPM", or_na(latest.average_bpm));
        let _ = writeln!(
            message,
            "• Finger Detected: {}",
            if latest.finger_detected { "Yes" } else { "No" }
        );
        let _ = writeln!(message, "• IR Sensor Value: {}\n", latest.ir_value);

        if let Some(stats) = &snapshot.stats {
            message.push_str("📈 STATISTICS:\n");
            let _ = writeln!(message, "• Max HR: {} BPM", stats.max);
            let _ = writeln!(message, "• Min HR: {} BPM", stats.min);
            let _ = writeln!(message, "• Data Points: {}", stats.count);
            let _ = writeln!(message, "• Variability: {:.2}\n", stats.std_dev);
        }

        message.push_str("💡 HEALTH INSIGHTS:\n");
        for (i, insight) in snapshot.insights.iter().enumerate() {
            let _ = writeln!(message, "{}. {}", i + 1, insight);
        }

        let _ = write!(
            message,
            "\n⏰ Report generated at: {}",
            self.clock.now().format("%Y-%m-%d %H:%M:%S")
        );

        message
    }
}

/// Display a reading, or "N/A" for the not-yet-measured placeholder
fn or_na(bpm: u32) -> String {
    if bpm > 0 {
        bpm.to_string()
    } else {
        "N/A".to_string()
    }
}

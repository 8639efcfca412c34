//! Console panel printed after every poll cycle
//!
//! A terminal rendition of the dashboard: connection state, the current
//! reading, status and trend, a sparkline of recent readings and the
//! statistics row.

use crate::aggregator::HistoryBuffer;
use crate::config::SourceMode;
use crate::insights::HeartRateStats;
use crate::monitor::PollOutcome;
use std::fmt::Write;

/// How many readings the sparkline shows
pub const SPARKLINE_WIDTH: usize = 40;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the panel for the cycle that produced `outcome`
pub fn render_panel(
    outcome: &PollOutcome,
    history: &HistoryBuffer,
    mode: SourceMode,
    source_label: &str,
) -> String {
    let mut panel = String::new();

    let sample = match outcome {
        PollOutcome::Recorded(sample) => sample,
        PollOutcome::NoData(reason) => {
            let _ = writeln!(panel, "● OFFLINE  {}", source_label);
            let _ = writeln!(panel, "Unable to reach the heart rate sensor: {}", reason);
            let _ = write!(panel, "Status: {}", history.current_status());
            return panel;
        }
    };

    let connection = match mode {
        SourceMode::Synthetic => "● MOCK DATA",
        SourceMode::Remote => "● CONNECTED",
    };
    let _ = writeln!(panel, "{}  {}", connection, source_label);

    let current = if sample.current_bpm > 0 && sample.finger_detected {
        format!("❤️ {}", sample.current_bpm)
    } else {
        "---".to_string()
    };
    let average = if sample.average_bpm > 0 {
        sample.average_bpm.to_string()
    } else {
        "---".to_string()
    };
    let _ = writeln!(
        panel,
        "BPM: {} ({})  |  Avg BPM: {} (Trend: {})",
        current,
        history.current_status(),
        average,
        history.trend()
    );

    let finger = if sample.finger_detected {
        "🟢 Detected"
    } else {
        "🔴 Not Detected"
    };
    let _ = writeln!(panel, "Finger: {}  |  IR: {}", finger, sample.ir_value);

    if history.len() < 2 {
        let _ = write!(panel, "Collecting data...");
        return panel;
    }

    let _ = writeln!(panel, "Chart: {}", sparkline(&history.recent_bpms(SPARKLINE_WIDTH)));
    match HeartRateStats::from_values(&history.valid_bpms()) {
        Some(stats) => {
            let _ = write!(
                panel,
                "Max: {}  Min: {}  Points: {}  Variability: {:.2}",
                stats.max, stats.min, stats.count, stats.std_dev
            );
        }
        None => {
            let _ = write!(panel, "No valid heart rate data yet");
        }
    }

    panel
}

/// Draw readings as block characters scaled between their min and max
///
/// Placeholder readings (0) are drawn as a gap.
pub fn sparkline(values: &[u32]) -> String {
    let valid = values.iter().copied().filter(|&v| v > 0);
    let (Some(min), Some(max)) = (valid.clone().min(), valid.max()) else {
        return " ".repeat(values.len());
    };
    let span = (max - min).max(1) as f64;

    values
        .iter()
        .map(|&v| {
            if v == 0 {
                ' '
            } else {
                let level = ((v - min) as f64 / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[level.min(BARS.len() - 1)]
            }
        })
        .collect()
}

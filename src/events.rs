//! Core telemetry types for the heart-rate monitor
//!
//! This module defines the sample structure kept in the history buffer, the wire
//! payload served by the sensor endpoint, and the severity levels attached to insights.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp type for consistent time handling across the application
pub type Timestamp = DateTime<Utc>;

/// One telemetry reading from the sensor
///
/// A `current_bpm` of 0 means the sensor has not produced a measurement yet;
/// it is a placeholder, not a physiological value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    /// Instantaneous heart rate in beats per minute
    pub current_bpm: u32,
    /// Device-side rolling average in beats per minute
    pub average_bpm: u32,
    /// Raw infrared sensor reading
    pub ir_value: i64,
    /// Whether the sensor reports a finger on the probe
    pub finger_detected: bool,
    /// When the sample was received
    pub captured_at: Timestamp,
}

impl Sample {
    /// Whether this sample carries an actual measurement
    pub fn is_valid(&self) -> bool {
        self.current_bpm > 0
    }
}

/// JSON body served by the sensor endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorPayload {
    pub heart_rate: HeartRateReading,
    pub sensor: SensorReading,
}

/// `heart_rate` section of the sensor payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeartRateReading {
    pub current_bpm: u32,
    pub average_bpm: u32,
    /// Device uptime in milliseconds, when the firmware sends it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// `sensor` section of the sensor payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorReading {
    pub ir_value: i64,
    pub finger_detected: bool,
}

impl SensorPayload {
    /// Stamp the payload with the time it was received
    pub fn into_sample(self, captured_at: Timestamp) -> Sample {
        Sample {
            current_bpm: self.heart_rate.current_bpm,
            average_bpm: self.heart_rate.average_bpm,
            ir_value: self.sensor.ir_value,
            finger_detected: self.sensor.finger_detected,
            captured_at,
        }
    }
}

/// Severity level for generated insights
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational insight, no action required
    Info,
    /// Warning that may require attention
    Warning,
    /// Critical issue requiring immediate attention
    Critical,
}

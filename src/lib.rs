/// Error types for the heart rate monitor
pub mod error;

/// Sample and payload types
pub mod events;

/// Configuration management
pub mod config;

/// Bounded sample history with status and trend classification
pub mod aggregator;

/// Statistics and rule-based health insights
pub mod insights;

/// Plain-text report rendering
pub mod report;

/// Synthetic and remote sample sources
pub mod sources;

/// Report delivery to the chat bot
pub mod notify;

/// Monitoring session and poll loop
pub mod monitor;

/// Console panel rendering
pub mod display;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::{ConfigError, MonitorError, NotifyError, SourceError};
pub use monitor::{MonitorSession, PollLoop, PollOutcome};

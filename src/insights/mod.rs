/// Insight engine and built-in rules
pub mod insight_engine;
pub mod rules;
pub mod stats;

pub use insight_engine::{generate_health_insights, Insight, InsightEngine, InsightRule};
pub use stats::HeartRateStats;

use crate::events::Severity;
use crate::insights::rules::{AverageRangeRule, PeakRule, TroughRule, VariabilityRule};
use crate::insights::HeartRateStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of valid readings before any statistics are reported
pub const MIN_VALUES_FOR_INSIGHTS: usize = 5;

/// Notice returned when there are too few readings to analyse
pub const INSUFFICIENT_DATA_NOTICE: &str = "Insufficient data for health analysis";

/// A human-readable advisory derived from the heart-rate statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub severity: Severity,
    pub message: String,
}

impl Insight {
    /// Create an insight with the given severity
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Create an informational insight
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Trait for rules that turn statistics into an advisory message
pub trait InsightRule: Send + Sync {
    /// Return an insight if this rule has something to say about the statistics
    fn evaluate(&self, stats: &HeartRateStats) -> Option<Insight>;

    /// Get a human-readable name for this rule
    fn name(&self) -> &str;
}

/// Engine that evaluates every rule against the statistics of valid readings
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl InsightEngine {
    /// Create an engine with no rules
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine with the built-in average, variability, peak and trough rules
    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(AverageRangeRule::with_defaults()));
        engine.add_rule(Box::new(VariabilityRule::with_defaults()));
        engine.add_rule(Box::new(PeakRule::with_defaults()));
        engine.add_rule(Box::new(TroughRule::with_defaults()));
        engine
    }

    /// Add a rule; rules are evaluated in insertion order
    pub fn add_rule(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Number of registered rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Generate insights for a series of valid BPM values
    ///
    /// With fewer than [`MIN_VALUES_FOR_INSIGHTS`] values the result is a single
    /// insufficient-data notice. Otherwise every rule is evaluated in order and
    /// all insights it produces are included.
    pub fn generate(&self, valid_bpms: &[u32]) -> Vec<Insight> {
        let stats = match HeartRateStats::from_values(valid_bpms) {
            Some(stats) if stats.count >= MIN_VALUES_FOR_INSIGHTS => stats,
            _ => return vec![Insight::info(INSUFFICIENT_DATA_NOTICE)],
        };

        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(&stats))
            .collect()
    }
}

/// Generate insights with the default rule set
pub fn generate_health_insights(valid_bpms: &[u32]) -> Vec<Insight> {
    InsightEngine::with_default_rules().generate(valid_bpms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(insights: &[Insight]) -> Vec<&str> {
        insights.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn test_insufficient_data() {
        for values in [&[][..], &[70][..], &[70, 72, 74, 76][..]] {
            let insights = generate_health_insights(values);
            assert_eq!(messages(&insights), vec![INSUFFICIENT_DATA_NOTICE]);
        }
    }

    #[test]
    fn test_normal_stable_readings() {
        let insights = generate_health_insights(&[70, 72, 74, 73, 71]);
        assert_eq!(
            messages(&insights),
            vec![
                "Normal average heart rate - within healthy range",
                "Stable heart rate pattern - consistent activity or rest state",
            ]
        );
    }

    #[test]
    fn test_end_to_end_scenario() {
        // mean 90, population std ~21.5, max 130, min 72
        let insights = generate_health_insights(&[72, 75, 78, 95, 130]);
        let messages = messages(&insights);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], "Normal average heart rate - within healthy range");
        assert!(messages[1].starts_with("High heart rate variability"));
        assert_eq!(messages[2], "⚠️ Warning: Detected very high heart rate values");
        assert!(!messages.iter().any(|m| m.contains("very low")));
    }

    #[test]
    fn test_all_rules_can_fire_together() {
        let insights = generate_health_insights(&[45, 130, 140, 135, 125]);
        let messages = messages(&insights);

        assert_eq!(messages.len(), 4);
        assert!(messages[0].starts_with("High average heart rate"));
        assert!(messages[1].starts_with("High heart rate variability"));
        assert!(messages[2].contains("very high"));
        assert!(messages[3].contains("very low"));
    }

    #[test]
    fn test_custom_engine() {
        let mut engine = InsightEngine::new();
        assert_eq!(engine.rule_count(), 0);
        assert!(engine.generate(&[70, 70, 70, 70, 70]).is_empty());

        engine.add_rule(Box::new(PeakRule::new(65)));
        let insights = engine.generate(&[70, 70, 70, 70, 70]);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Warning);
    }
}

// Property-based tests
#[cfg(test)]
mod property_tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn prop_short_series_yield_single_notice(values: Vec<u32>) -> bool {
        let values: Vec<u32> = values
            .into_iter()
            .map(|v| v % 250 + 1)
            .take(MIN_VALUES_FOR_INSIGHTS - 1)
            .collect();
        generate_health_insights(&values) == vec![Insight::info(INSUFFICIENT_DATA_NOTICE)]
    }

    #[quickcheck]
    fn prop_long_series_always_assess_average_and_variability(values: Vec<u8>) -> bool {
        let mut values: Vec<u32> = values.into_iter().map(|v| u32::from(v) + 1).collect();
        while values.len() < MIN_VALUES_FOR_INSIGHTS {
            values.push(75);
        }

        let insights = generate_health_insights(&values);
        insights.len() >= 2
            && insights.len() <= 4
            && insights[0].message.contains("average heart rate")
            && insights
                .iter()
                .all(|i| i.message != INSUFFICIENT_DATA_NOTICE)
    }
}

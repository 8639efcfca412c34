/// Descriptive statistics over valid BPM values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartRateStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
}

impl HeartRateStats {
    /// Compute statistics, or `None` for an empty slice
    pub fn from_values(values: &[u32]) -> Option<Self> {
        let min = *values.iter().min()?;
        let max = *values.iter().max()?;
        let count = values.len();

        let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / count as f64;
        let variance = values
            .iter()
            .map(|&v| {
                let diff = f64::from(v) - mean;
                diff * diff
            })
            .sum::<f64>()
            / count as f64;

        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_stats() {
        assert_eq!(HeartRateStats::from_values(&[]), None);
    }

    #[test]
    fn test_single_value() {
        let stats = HeartRateStats::from_values(&[72]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 72.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.min, 72);
        assert_eq!(stats.max, 72);
    }

    #[test]
    fn test_population_std_dev() {
        let stats = HeartRateStats::from_values(&[72, 75, 78, 95, 130]).unwrap();
        assert_eq!(stats.mean, 90.0);
        // sum of squared deviations is 2318 over 5 values
        assert!((stats.std_dev - (2318.0f64 / 5.0).sqrt()).abs() < 1e-9);
        assert_eq!(stats.min, 72);
        assert_eq!(stats.max, 130);
    }
}

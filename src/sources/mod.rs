//! Sample sources
//!
//! A source produces one sample per poll. The configured [`SourceMode`] picks
//! the implementation: synthetic generation or the remote sensor endpoint.

pub mod remote;
pub mod synthetic;

pub use remote::RemoteSource;
pub use synthetic::SyntheticSource;

use crate::config::{Config, SourceMode};
use crate::error::SourceError;
use crate::events::Sample;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Trait for anything that can produce telemetry samples
pub trait SampleSource: Send {
    /// Acquire one sample
    fn fetch<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Sample, SourceError>> + Send + 'a>>;

    /// Which mode this source implements
    fn mode(&self) -> SourceMode;

    /// Short description for logs and the console panel
    fn describe(&self) -> String;
}

/// Build the source selected by the configuration
pub fn from_config(config: &Config) -> Result<Box<dyn SampleSource>, SourceError> {
    match config.source.mode {
        SourceMode::Synthetic => Ok(Box::new(SyntheticSource::new(&config.synthetic))),
        SourceMode::Remote => Ok(Box::new(RemoteSource::new(
            config.source.url.clone(),
            Duration::from_secs(config.source.timeout_seconds),
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_selects_mode() {
        let mut config = Config::default();
        let source = from_config(&config).unwrap();
        assert_eq!(source.mode(), SourceMode::Remote);
        assert_eq!(source.describe(), "http://192.168.0.102/api");

        config.source.mode = SourceMode::Synthetic;
        let source = from_config(&config).unwrap();
        assert_eq!(source.mode(), SourceMode::Synthetic);
    }

    #[test]
    fn test_from_config_rejects_blank_url() {
        let mut config = Config::default();
        config.source.url = String::new();
        assert!(matches!(
            from_config(&config),
            Err(SourceError::MissingEndpoint)
        ));
    }
}

use thiserror::Error;

/// Errors that can occur while acquiring a sample
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Sensor endpoint is not configured")]
    MissingEndpoint,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Sensor endpoint returned status code: {0}")]
    UnexpectedStatus(u16),

    #[error("Invalid JSON response from sensor endpoint: {0}")]
    InvalidPayload(String),

    #[error("Connection issue: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Errors that can occur when sending a report to the messaging endpoint
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Please provide both a bot token and a chat id")]
    MissingCredentials,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Messaging endpoint returned status code: {0}")]
    UnexpectedStatus(u16),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Errors that can occur while setting up a monitoring session
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sample source error: {0}")]
    Source(#[from] SourceError),

    #[error("Notifier error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

use clap::Parser;
use log::{error, info, warn};
use pulsewatch::config::{Config, SourceMode};
use pulsewatch::display::render_panel;
use pulsewatch::error::{ConfigError, NotifyError};
use pulsewatch::monitor::{check_endpoint, MonitorSession, PollLoop};
use std::path::PathBuf;
use std::sync::mpsc;

/// Command-line arguments for the heart rate monitor
#[derive(Parser)]
#[command(
    name = "pulsewatch",
    about = "Heart rate monitor - polls a pulse sensor and reports readings",
    long_about = "Polls a heart rate sensor (or a synthetic stand-in) at a fixed interval, \
                  keeps a bounded history of readings, classifies status and trend, and \
                  can push a formatted health report to a Telegram chat."
)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,

    /// Use generated readings instead of the sensor endpoint
    #[arg(long)]
    mock: bool,

    /// Sensor endpoint URL
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Seconds between polls (1-10)
    #[arg(short, long, value_name = "SECS")]
    interval: Option<u64>,

    /// Number of readings to keep (50-500)
    #[arg(long, value_name = "N")]
    history: Option<usize>,

    /// Patient name shown in reports
    #[arg(long, value_name = "NAME")]
    patient: Option<String>,

    /// Stop after this many polls
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Send a report to the configured chat when monitoring stops
    #[arg(long)]
    send_report: bool,

    /// Check that the sensor endpoint is reachable and exit
    #[arg(long)]
    check: bool,
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// Range checks on numeric overrides happen later in
    /// `Config::validate`, once they are merged with the file.
    fn validate(&self) -> Result<(), String> {
        if let Some(ref config_path) = self.config {
            // Missing files fall back to defaults in load_config
            if config_path.exists() {
                if !config_path.is_file() {
                    return Err(format!(
                        "Configuration path is not a file: {}",
                        config_path.display()
                    ));
                }

                if let Some(extension) = config_path.extension() {
                    if extension != "toml" {
                        warn!(
                            "Configuration file does not have .toml extension: {}",
                            config_path.display()
                        );
                    }
                }
            }
        }

        if self.mock && self.check {
            return Err(
                "--check needs the sensor endpoint and cannot be used with --mock".to_string(),
            );
        }

        if let Some(ref url) = self.url {
            if url.trim().is_empty() {
                return Err("--url must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Convert config path to string safely, handling non-UTF-8 paths
    fn config_path_str(&self) -> Result<Option<&str>, String> {
        match &self.config {
            Some(path) => match path.to_str() {
                Some(path_str) => Ok(Some(path_str)),
                None => Err(format!(
                    "Configuration file path contains invalid UTF-8 characters: {}",
                    path.display()
                )),
            },
            None => Ok(None),
        }
    }

    /// Apply command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if self.mock {
            config.source.mode = SourceMode::Synthetic;
        }
        if let Some(ref url) = self.url {
            config.source.url = url.trim().to_string();
        }
        if let Some(interval) = self.interval {
            config.polling.interval_seconds = interval;
        }
        if let Some(capacity) = self.history {
            config.history.capacity = capacity;
        }
        if let Some(ref patient) = self.patient {
            config.report.patient_name = Some(patient.clone());
        }
        if let Some(cycles) = self.cycles {
            config.polling.max_cycles = Some(cycles);
        }
    }
}

/// Load configuration from file or use defaults
///
/// A missing or unreadable file and an invalid file both fall back to the
/// default configuration; only the log level differs.
fn load_config(config_path: Option<&str>) -> Config {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            match Config::from_file(std::path::Path::new(path)) {
                Ok(config) => config,
                Err(ConfigError::ReadError(_)) => {
                    warn!(
                        "Configuration file '{}' not found or unreadable, using defaults",
                        path
                    );
                    Config::default()
                }
                Err(e) => {
                    error!("Configuration error in '{}': {}", path, e);
                    warn!("Using default configuration due to invalid config file");
                    Config::default()
                }
            }
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    info!("Starting heart rate monitor");

    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    let config_path = match cli.config_path_str() {
        Ok(path) => path,
        Err(e) => {
            error!("Invalid configuration path: {}", e);
            std::process::exit(1);
        }
    };

    let mut config = load_config(config_path);
    cli.apply_overrides(&mut config);
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    if cli.check {
        match check_endpoint(&config) {
            Ok(()) => {
                println!("Successfully connected to {}", config.source.url);
                return;
            }
            Err(e) => {
                println!("Failed to connect to {}: {}", config.source.url, e);
                std::process::exit(1);
            }
        }
    }

    if config.source.mode == SourceMode::Remote {
        match check_endpoint(&config) {
            Ok(()) => info!("Sensor endpoint {} is reachable", config.source.url),
            Err(e) => warn!(
                "Sensor endpoint {} is not reachable yet: {}",
                config.source.url, e
            ),
        }
    }

    let mut session = match MonitorSession::new(config) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to initialize monitoring session: {}", e);
            std::process::exit(1);
        }
    };

    let (shutdown_sender, shutdown_receiver) = mpsc::channel();
    // Held until exit so the loop still sees a live channel without a handler
    let _shutdown_keepalive = shutdown_sender.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received interrupt signal (SIGINT), shutting down gracefully...");
        if let Err(e) = shutdown_sender.send(()) {
            error!("Failed to send shutdown signal: {}", e);
        }
    }) {
        error!("Failed to install Ctrl+C handler: {}", e);
        warn!("Monitoring will run until the cycle limit or until the process is killed");
    }

    info!("Heart rate monitor is running. Press Ctrl+C to stop.");

    let poll_loop = PollLoop::from_config(session.config());
    let cycles = poll_loop.run(&mut session, &shutdown_receiver, |session, cycle| {
        println!(
            "\n#{}\n{}",
            cycle.cycle,
            render_panel(
                &cycle.outcome,
                session.history(),
                session.source_mode(),
                &session.source_description(),
            )
        );
        match cycle.report_sent {
            Some(true) => println!("Report sent to Telegram"),
            Some(false) => println!("Failed to send report to Telegram"),
            None => {}
        }
    });

    info!("Monitoring stopped after {} cycles", cycles);

    if cli.send_report {
        println!("\n{}", session.report());
        match session.send_report() {
            Ok(true) => println!("Report sent successfully!"),
            Ok(false) => println!("Failed to send report. See the log for the reason."),
            Err(NotifyError::MissingCredentials) => {
                error!("{}", NotifyError::MissingCredentials);
                std::process::exit(1);
            }
            Err(e) => {
                error!("Failed to send report: {}", e);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            config: None,
            verbose: false,
            mock: false,
            url: None,
            interval: None,
            history: None,
            patient: None,
            cycles: None,
            send_report: false,
            check: false,
        }
    }

    #[test]
    fn test_cli_validation_with_existing_file() {
        let temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(temp_file.path(), "[source]\nmode = \"synthetic\"").unwrap();

        let cli = Cli {
            config: Some(temp_file.path().to_path_buf()),
            ..base_cli()
        };

        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_with_missing_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/config.toml")),
            ..base_cli()
        };

        // Should not fail - missing files fall back to defaults
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_with_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            config: Some(dir.path().to_path_buf()),
            ..base_cli()
        };

        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_cli_validation_rejects_conflicts() {
        let cli = Cli {
            mock: true,
            check: true,
            ..base_cli()
        };
        assert!(cli.validate().is_err());

        let cli = Cli {
            url: Some("  ".to_string()),
            ..base_cli()
        };
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_config_path_str() {
        let cli = Cli {
            config: Some(PathBuf::from("config.toml")),
            ..base_cli()
        };
        assert_eq!(cli.config_path_str().unwrap(), Some("config.toml"));
        assert_eq!(base_cli().config_path_str().unwrap(), None);
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli {
            mock: true,
            url: Some(" http://10.0.0.5/api ".to_string()),
            interval: Some(5),
            history: Some(200),
            patient: Some("Jane Doe".to_string()),
            cycles: Some(10),
            ..base_cli()
        };

        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.source.mode, SourceMode::Synthetic);
        assert_eq!(config.source.url, "http://10.0.0.5/api");
        assert_eq!(config.polling.interval_seconds, 5);
        assert_eq!(config.history.capacity, 200);
        assert_eq!(config.report.patient_name.as_deref(), Some("Jane Doe"));
        assert_eq!(config.polling.max_cycles, Some(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_override_fails_validation() {
        let cli = Cli {
            interval: Some(30),
            ..base_cli()
        };

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_fallbacks() {
        assert_eq!(load_config(None), Config::default());
        assert_eq!(
            load_config(Some("/nonexistent/pulsewatch.toml")),
            Config::default()
        );

        let temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(temp_file.path(), "[polling\ninterval_seconds = ").unwrap();
        let path = temp_file.path().to_str().unwrap();
        assert_eq!(load_config(Some(path)), Config::default());

        std::fs::write(temp_file.path(), "[history]\ncapacity = 250").unwrap();
        assert_eq!(load_config(Some(path)).history.capacity, 250);
    }
}

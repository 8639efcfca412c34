//! Monitoring session and poll loop
//!
//! A [`MonitorSession`] is the explicit context for one monitoring run: it owns
//! the configuration, the sample source, the history buffer and the notifier.
//! [`PollLoop`] drives it with a fixed delay between cycles until it is told to
//! stop or reaches its cycle limit.

use crate::aggregator::{HistoryBuffer, Status, Trend};
use crate::config::{Config, SourceMode, HISTORY_RANGE};
use crate::error::{MonitorError, NotifyError};
use crate::events::Sample;
use crate::insights::InsightEngine;
use crate::notify::{RateLimiter, TelegramNotifier};
use crate::report::{ReportFormatter, ReportSnapshot};
use crate::sources::{self, RemoteSource, SampleSource};
use log::{debug, info, warn};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// Result of one poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// A sample was fetched and recorded
    Recorded(Sample),
    /// Nothing was recorded this cycle; carries the reason
    NoData(String),
}

/// What happened during one cycle of the loop
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    pub outcome: PollOutcome,
    /// Whether a periodic report went out, if one was due
    pub report_sent: Option<bool>,
}

/// State of one monitoring run
pub struct MonitorSession {
    config: Config,
    source: Box<dyn SampleSource>,
    history: HistoryBuffer,
    insight_engine: InsightEngine,
    formatter: ReportFormatter,
    notifier: Option<TelegramNotifier>,
    /// Caps periodic reports; on-demand reports bypass it
    report_limiter: Option<RateLimiter>,
    runtime: Runtime,
    cycles: u64,
}

impl MonitorSession {
    /// Create a session with an empty history and the source chosen by `config`
    ///
    /// # Errors
    ///
    /// Returns `MonitorError` if the configuration is invalid, the source or
    /// notifier cannot be built, or the runtime fails to start.
    pub fn new(config: Config) -> Result<Self, MonitorError> {
        config.validate()?;
        let source = sources::from_config(&config)?;
        Self::with_source(config, source)
    }

    /// Create a session around an already constructed source
    pub fn with_source(
        config: Config,
        source: Box<dyn SampleSource>,
    ) -> Result<Self, MonitorError> {
        let notifier = match config.notify.credentials() {
            Some(_) => Some(TelegramNotifier::from_config(&config.notify)?),
            None => None,
        };

        let report_limiter = match config.notify.max_reports_per_minute {
            0 => None,
            max => Some(RateLimiter::new(max)),
        };

        let runtime = Builder::new_current_thread().enable_all().build()?;

        info!(
            "Monitoring session created: source={}, history capacity={}",
            source.describe(),
            config.history.capacity
        );

        Ok(Self {
            history: HistoryBuffer::new(config.history.capacity),
            insight_engine: InsightEngine::with_default_rules(),
            formatter: ReportFormatter::new(),
            config,
            source,
            notifier,
            report_limiter,
            runtime,
            cycles: 0,
        })
    }

    /// Configuration the session was built with, including runtime changes
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Mode of the active sample source
    pub fn source_mode(&self) -> SourceMode {
        self.source.mode()
    }

    /// Endpoint URL or "synthetic data"
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Number of cycles run so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Status derived from the latest sample
    pub fn current_status(&self) -> Status {
        self.history.current_status()
    }

    /// Trend over the last few valid readings
    pub fn trend(&self) -> Trend {
        self.history.trend()
    }

    /// Change how many samples are kept
    ///
    /// The value is clamped to [`HISTORY_RANGE`], the same bounds the
    /// configuration enforces.
    pub fn set_history_capacity(&mut self, capacity: usize) {
        let capacity = capacity.clamp(*HISTORY_RANGE.start(), *HISTORY_RANGE.end());
        self.history.set_capacity(capacity);
        self.config.history.capacity = self.history.capacity();
    }

    /// Forget every recorded sample
    pub fn reset(&mut self) {
        info!("Resetting history ({} samples dropped)", self.history.len());
        self.history.reset();
    }

    /// Fetch one sample and record it
    ///
    /// A failed fetch leaves the history untouched and yields
    /// [`PollOutcome::NoData`].
    pub fn poll_once(&mut self) -> PollOutcome {
        match self.runtime.block_on(self.source.fetch()) {
            Ok(sample) => {
                debug!(
                    "Recorded sample: bpm={}, avg={}, ir={}, finger={}",
                    sample.current_bpm, sample.average_bpm, sample.ir_value, sample.finger_detected
                );
                self.history.record(sample.clone());
                PollOutcome::Recorded(sample)
            }
            Err(e) => {
                warn!("No data from {}: {}", self.source.describe(), e);
                PollOutcome::NoData(e.to_string())
            }
        }
    }

    /// Capture the current state for reporting
    pub fn snapshot(&self) -> ReportSnapshot {
        ReportSnapshot::capture(
            &self.history,
            &self.insight_engine,
            self.config.report.patient_name.as_deref(),
        )
    }

    /// Render the current report text
    pub fn report(&self) -> String {
        self.formatter.format(&self.snapshot())
    }

    /// Push the current report to the chat bot
    ///
    /// On-demand reports are not subject to the periodic report cap.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::MissingCredentials` when no bot token and chat
    /// id are configured. Delivery failures are not errors; they yield
    /// `Ok(false)`.
    pub fn send_report(&mut self) -> Result<bool, NotifyError> {
        let text = self.report();
        let notifier = self
            .notifier
            .as_ref()
            .ok_or(NotifyError::MissingCredentials)?;
        Ok(self.runtime.block_on(notifier.send(&text)))
    }

    /// Send the report due this cycle unless the per-minute cap is reached
    fn send_periodic_report(&mut self) -> Result<bool, NotifyError> {
        if let Some(limiter) = self.report_limiter.as_mut() {
            if !limiter.can_send() {
                return Err(NotifyError::RateLimitExceeded);
            }
        }

        let sent = self.send_report()?;
        if sent {
            if let Some(limiter) = self.report_limiter.as_mut() {
                limiter.record_send();
            }
        }
        Ok(sent)
    }

    /// Run one cycle: poll, record and send a periodic report when due
    pub fn run_cycle(&mut self) -> CycleReport {
        self.cycles += 1;
        let outcome = self.poll_once();

        let report_sent = match self.config.notify.report_every_cycles {
            Some(every) if every > 0 && self.cycles % every == 0 => {
                Some(self.send_periodic_report().unwrap_or_else(|e| {
                    warn!("Periodic report skipped: {}", e);
                    false
                }))
            }
            _ => None,
        };

        CycleReport {
            cycle: self.cycles,
            outcome,
            report_sent,
        }
    }
}

/// Check that the configured sensor endpoint answers with 200
pub fn check_endpoint(config: &Config) -> Result<(), MonitorError> {
    let source = RemoteSource::new(
        config.source.url.clone(),
        Duration::from_secs(config.source.timeout_seconds),
    )?;
    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime
        .block_on(source.probe())
        .map_err(MonitorError::from)
}

/// Fixed-delay loop that runs session cycles until stopped
#[derive(Debug, Clone)]
pub struct PollLoop {
    interval: Duration,
    max_cycles: Option<u64>,
}

impl PollLoop {
    /// Create a loop with a fixed delay between cycles
    ///
    /// # Arguments
    ///
    /// * `interval` - Wait between the end of one cycle and the start of the next
    /// * `max_cycles` - Stop after this many cycles; `None` runs until shutdown
    pub fn new(interval: Duration, max_cycles: Option<u64>) -> Self {
        Self {
            interval,
            max_cycles,
        }
    }

    /// Create a loop from the `[polling]` section
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.polling.interval(), config.polling.max_cycles)
    }

    /// Run cycles until a shutdown signal arrives or the cycle limit is hit
    ///
    /// `on_cycle` is called after every cycle. Between cycles the loop waits
    /// on `shutdown` for up to the interval, so a stop request ends the wait
    /// immediately. Returns the number of cycles run.
    pub fn run<F>(
        &self,
        session: &mut MonitorSession,
        shutdown: &Receiver<()>,
        mut on_cycle: F,
    ) -> u64
    where
        F: FnMut(&MonitorSession, &CycleReport),
    {
        info!(
            "Poll loop started: interval={:?}, max_cycles={:?}",
            self.interval, self.max_cycles
        );
        let mut completed = 0;

        loop {
            if shutdown.try_recv().is_ok() {
                info!("Poll loop received shutdown signal");
                break;
            }

            let report = session.run_cycle();
            completed += 1;
            on_cycle(session, &report);

            if self.max_cycles.is_some_and(|max| completed >= max) {
                info!("Poll loop reached its limit of {} cycles", completed);
                break;
            }

            match shutdown.recv_timeout(self.interval) {
                Ok(()) => {
                    info!("Poll loop received shutdown signal");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Shutdown channel disconnected, stopping poll loop");
                    break;
                }
            }
        }

        info!("Poll loop stopped after {} cycles", completed);
        completed
    }
}

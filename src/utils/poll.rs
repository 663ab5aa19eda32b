//! Fixed-interval polling until a report reaches a terminal state.
//!
//! Time is read and slept through the [`Clock`] trait so the loop can be
//! driven by virtual time in tests ([`ManualClock`]).

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{field_message, Result, SurmadoError};
use crate::models::ReportStatus;

/// Default overall wait: 20 minutes
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Default delay between status checks: 30 seconds
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Options for [`wait_for_report`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Give up once this much time has passed since the first poll
    pub timeout: Duration,
    /// Sleep between polls
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitOptions {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Set the overall timeout in minutes
    pub fn timeout_minutes(mut self, minutes: u64) -> Self {
        self.timeout = Duration::from_secs(minutes.saturating_mul(60));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn describe_timeout(&self) -> String {
        let secs = self.timeout.as_secs();
        if secs % 60 == 0 {
            format!("{} minutes", secs / 60)
        } else {
            format!("{} seconds", secs)
        }
    }
}

/// Source of elapsed time and sleeps for the polling loop
#[async_trait]
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Monotonic time since an arbitrary fixed origin
    fn now(&self) -> Duration;

    /// Suspend for the given duration
    async fn sleep(&self, duration: Duration);
}

/// Real time, backed by tokio's monotonic clock
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock for tests: sleeping advances time instantly and is recorded.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move virtual time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += duration;
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        self.advance(duration);
    }
}

/// Anything that can fetch the current snapshot of a report
#[async_trait]
pub trait ReportFetcher: Send + Sync {
    async fn fetch_report(&self, report_id: &str) -> Result<Value>;
}

/// Poll `report_id` until it completes, fails, is cancelled, or the timeout passes.
///
/// Returns the completed snapshot. Queued, processing and unrecognized states
/// keep polling at a fixed interval. Errors from the fetcher are returned
/// as-is.
pub async fn wait_for_report<F, C>(
    fetcher: &F,
    clock: &C,
    report_id: &str,
    options: &WaitOptions,
) -> Result<Value>
where
    F: ReportFetcher + ?Sized,
    C: Clock + ?Sized,
{
    let start = clock.now();
    let mut last_status: Option<ReportStatus> = None;

    while clock.now().saturating_sub(start) < options.timeout {
        let report = fetcher.fetch_report(report_id).await?;
        let status = ReportStatus::of(&report);

        if last_status.as_ref() != Some(&status) {
            tracing::info!(report_id, status = %status, "Report status");
            last_status = Some(status.clone());
        }

        match status {
            ReportStatus::Completed => return Ok(report),
            ReportStatus::Failed => {
                let message = field_message(&report, &["error"])
                    .unwrap_or_else(|| "Report processing failed".to_string());
                tracing::warn!(report_id, "Report failed: {}", message);
                return Err(SurmadoError::api(message, report));
            }
            ReportStatus::Cancelled => {
                tracing::warn!(report_id, "Report was cancelled");
                return Err(SurmadoError::api("Report was cancelled", report));
            }
            _ => {
                tracing::debug!(
                    report_id,
                    "Sleeping {:?} before next status check",
                    options.poll_interval
                );
                clock.sleep(options.poll_interval).await;
            }
        }
    }

    tracing::warn!(report_id, "Gave up waiting for report");
    Err(SurmadoError::api(
        format!("Report did not complete within {}", options.describe_timeout()),
        json!({"report_id": report_id, "status": "timeout"}),
    ))
}

//! Utility modules supporting the client.
//!
//! - [`HttpClient`]: reqwest client preconfigured with authentication headers
//! - [`wait_for_report`]: fixed-interval polling until a report finishes
//! - [`Clock`]: time source used by the poller ([`TokioClock`], [`ManualClock`])
//!
//! # Waiting on a report
//!
//! ```rust,no_run
//! use surmado::utils::WaitOptions;
//! use surmado::Surmado;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Surmado::new(None)?;
//! let options = WaitOptions::default()
//!     .timeout_minutes(30)
//!     .poll_interval(Duration::from_secs(15));
//! let report = client.wait_for_report("rpt_abc123", &options).await?;
//! println!("PDF: {}", report["download_url"]);
//! # Ok(())
//! # }
//! ```

mod http;
mod poll;

pub use http::{HttpClient, API_KEY_HEADER, USER_AGENT};
pub use poll::{
    wait_for_report, Clock, ManualClock, ReportFetcher, TokioClock, WaitOptions,
    DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT,
};

//! # Surmado
//!
//! Rust client for the [Surmado](https://surmado.com) marketing intelligence API.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`client`]: The [`Surmado`] API client, one method per endpoint
//! - [`models`]: Request payloads (Signal, Scan, Solutions, reruns) and report views
//! - [`error`]: [`SurmadoError`], the typed classification of API failures
//! - [`utils`]: HTTP transport and the wait-for-completion poller
//! - [`config`]: Configuration management
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use surmado::models::{ScanRequest, ScanTier};
//! use surmado::utils::WaitOptions;
//! use surmado::{Surmado, SurmadoError};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Surmado::new(None)?; // reads SURMADO_API_KEY
//!
//! let request = ScanRequest::new("https://example.com", "Example Brand", "you@example.com")
//!     .tier(ScanTier::Basic);
//! match client.scan(&request).await {
//!     Ok(created) => {
//!         let report_id = created["report_id"].as_str().unwrap_or_default();
//!         let report = client.wait_for_report(report_id, &WaitOptions::default()).await?;
//!         println!("PDF: {}", report["download_url"]);
//!     }
//!     Err(SurmadoError::InsufficientCredits { .. }) => println!("Top up at surmado.com"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use client::{Surmado, SurmadoBuilder};
pub use error::{Result, SurmadoError};
pub use models::{Report, ReportStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

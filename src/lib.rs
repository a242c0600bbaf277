//! **Client library for the EPSS (Exploit Prediction Scoring System) feed.**
//!
//! `epss-tools` looks up exploitation-probability scores for CVE
//! identifiers from the FIRST.org EPSS feed. It exposes two layers:
//!
//! - **[`api`]**: the low-level [`EpssApi`] — raw lookup and listing
//!   calls returning the decoded envelope, plus a generic call that
//!   returns the serialized payload (JSON, CSV, or YAML) unparsed.
//! - **[`client`]**: the high-level [`EpssClient`] — single-id lookups,
//!   batch lookups, historical time-series lookups, and filtered
//!   listing with threshold and wildcard-pattern criteria.
//!
//! Calls are blocking and stateless; errors are plain values
//! ([`EpssError`]) with transport failures retried internally.
//!
//! ## Looking up a score
//!
//! ```no_run
//! use epss_tools::{CallOptions, EpssClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EpssClient::with_defaults()?;
//!
//!     let (score, _result) = client.lookup_score("cve-2022-26332", &CallOptions::default())?;
//!     println!(
//!         "{} scored {:.5} ({}th percentile) on {}",
//!         score.cve,
//!         score.epss,
//!         (score.percentile * 100.0).round(),
//!         score.date
//!     );
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Filtered listing
//!
//! ```no_run
//! use epss_tools::{EpssClient, FilterOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EpssClient::with_defaults()?;
//!
//!     let filter = FilterOptions {
//!         cve_id_pattern: Some("2023".to_string()),
//!         score_gt: Some(0.1),
//!         percentile_gt: Some(0.98),
//!         days_since_added: Some(100),
//!         ..Default::default()
//!     };
//!     let (scores, result) = client.list_scores(&filter)?;
//!     println!("{} of {} matching records", scores.len(), result.total);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod client;
pub mod error;
pub mod model;
pub mod output;

pub use api::{ApiConfig, CallOptions, EpssApi, FilterOptions, EPSS_API_URL};
pub use client::EpssClient;
pub use error::{EpssError, FormatErrorKind, Result, TransportErrorKind};
pub use model::{HistoryEntry, LookupResult, Score, ScoreWithHistory};
pub use output::{decode_records, encode_records, OutputFormat};

//! High-level EPSS client.
//!
//! [`EpssClient`] wraps the low-level [`EpssApi`] with convenience
//! operations: single-id lookups, batch lookups, historical time-series
//! lookups, and filtered listing.
//!
//! The "not found" contract is deliberately asymmetric, matching the
//! original API shape: single-id lookups fail with
//! [`EpssError::NotFound`] when the id has no data, while batch and
//! listing calls return partial or empty results without error.
//!
//! # Example
//!
//! ```no_run
//! use epss_tools::{CallOptions, EpssClient};
//!
//! let client = EpssClient::with_defaults()?;
//! let (score, result) = client.lookup_score("cve-2022-26332", &CallOptions::default())?;
//! println!("{}: {} (p{})", score.cve, score.epss, score.percentile);
//! println!("feed total: {}", result.total);
//! # Ok::<(), epss_tools::EpssError>(())
//! ```

use crate::api::{ApiConfig, CallOptions, EpssApi, FilterOptions};
use crate::error::{EpssError, Result};
use crate::model::{LookupResult, Score, ScoreWithHistory};
use chrono::NaiveDate;

/// Select the first record of a single-id lookup, or report the miss.
fn first_record(
    result: &LookupResult,
    cve_id: &str,
    date: Option<NaiveDate>,
) -> Result<ScoreWithHistory> {
    result
        .records
        .first()
        .cloned()
        .ok_or_else(|| EpssError::NotFound {
            cve_id: cve_id.to_string(),
            date,
        })
}

/// Convenience client over the EPSS feed.
///
/// Holds no mutable state; calls are independent and the client can be
/// shared across threads.
pub struct EpssClient {
    api: EpssApi,
}

impl EpssClient {
    /// Create a client with an explicit configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self {
            api: EpssApi::new(config)?,
        })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ApiConfig::default())
    }

    /// Access the underlying low-level API.
    #[must_use]
    pub const fn api(&self) -> &EpssApi {
        &self.api
    }

    /// Look up the score for one CVE id, at `options.date` or the latest
    /// available date.
    ///
    /// Returns [`EpssError::NotFound`] when the id has no data.
    pub fn lookup_score(
        &self,
        cve_id: &str,
        options: &CallOptions,
    ) -> Result<(Score, LookupResult)> {
        let result = self.api.lookup_call(&[cve_id.to_string()], options)?;
        let score = first_record(&result, cve_id, options.date)?.score;
        Ok((score, result))
    }

    /// Look up the latest score for one CVE id with its full time series.
    pub fn lookup_score_with_history(
        &self,
        cve_id: &str,
    ) -> Result<(ScoreWithHistory, LookupResult)> {
        let options = CallOptions::with_history();
        let result = self.api.lookup_call(&[cve_id.to_string()], &options)?;
        let record = first_record(&result, cve_id, None)?;
        Ok((record, result))
    }

    /// Look up the latest scores for a batch of CVE ids.
    ///
    /// Ids with no data are absent from the returned list; misses never
    /// fail the call.
    pub fn lookup_scores(&self, cve_ids: &[String]) -> Result<(Vec<Score>, LookupResult)> {
        let result = self.api.lookup_call(cve_ids, &CallOptions::default())?;
        let scores = result.scores();
        Ok((scores, result))
    }

    /// Batch lookup with history, honoring `options.date`.
    pub fn lookup_scores_with_history(
        &self,
        cve_ids: &[String],
        options: &CallOptions,
    ) -> Result<(Vec<ScoreWithHistory>, LookupResult)> {
        let options = CallOptions {
            date: options.date,
            with_history: true,
        };
        let result = self.api.lookup_call(cve_ids, &options)?;
        let records = result.records.clone();
        Ok((records, result))
    }

    /// List scores matching the filter.
    ///
    /// An empty list with no error means nothing matched.
    pub fn list_scores(&self, filter: &FilterOptions) -> Result<(Vec<Score>, LookupResult)> {
        let result = self.api.list_call(filter)?;
        let scores = result.scores();
        Ok((scores, result))
    }

    /// Filtered listing with history attached per match.
    pub fn list_scores_with_history(
        &self,
        filter: &FilterOptions,
    ) -> Result<(Vec<ScoreWithHistory>, LookupResult)> {
        let filter = FilterOptions {
            options: CallOptions {
                date: filter.options.date,
                with_history: true,
            },
            ..filter.clone()
        };
        let result = self.api.list_call(&filter)?;
        let records = result.records.clone();
        Ok((records, result))
    }
}

//! Low-level EPSS API layer.
//!
//! [`EpssApi`] issues raw lookup and listing calls against the FIRST.org
//! EPSS feed and decodes the JSON envelope into [`crate::model`] types.
//! Transport failures are retried with exponential backoff; format
//! failures are surfaced immediately.

pub mod response;

use crate::error::{EpssError, FormatErrorKind, Result, TransportErrorKind};
use crate::model::LookupResult;
use crate::output::{self, OutputFormat};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use response::{FeedEnvelope, FEED_DATE_FORMAT};
use std::time::Duration;

/// Default FIRST.org EPSS feed URL
pub const EPSS_API_URL: &str = "https://api.first.org/data/v1/epss";

/// EPSS API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for the EPSS feed
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retries for failed requests
    pub max_retries: u8,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: EPSS_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

/// Options recognized by lookup calls.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Score date; defaults to the latest available when None
    pub date: Option<NaiveDate>,
    /// Request the full time series per record
    pub with_history: bool,
}

impl CallOptions {
    /// Options pinned to a specific date.
    #[must_use]
    pub const fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            with_history: false,
        }
    }

    /// Options requesting history.
    #[must_use]
    pub const fn with_history() -> Self {
        Self {
            date: None,
            with_history: true,
        }
    }
}

/// Filter criteria for listing calls.
///
/// Threshold, recency, date, and pagination filters are pushed to the
/// feed as query parameters; `cve_id_pattern` is applied client-side
/// (the feed has no pattern parameter). All active filters are
/// AND-combined.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Shared call options (date, history)
    pub options: CallOptions,
    /// CVE id pattern: case-insensitive substring, `*`/`?` wildcards
    pub cve_id_pattern: Option<String>,
    /// Only records with a score strictly greater than this
    pub score_gt: Option<f64>,
    /// Only records with a percentile strictly greater than this
    pub percentile_gt: Option<f64>,
    /// Only records first scored within the last N days
    pub days_since_added: Option<u32>,
    /// Feed-side pagination limit
    pub limit: Option<usize>,
    /// Feed-side pagination offset
    pub offset: Option<usize>,
}

/// Blocking HTTP client for the EPSS feed.
///
/// Stateless between calls; safe to share across threads.
pub struct EpssApi {
    client: Client,
    config: ApiConfig,
}

/// Helper to convert reqwest errors to transport errors
fn network_error(context: &str, err: &reqwest::Error) -> EpssError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else {
        TransportErrorKind::Network(err.to_string())
    };
    EpssError::transport(context, kind)
}

impl EpssApi {
    /// Create a new API client.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| {
                EpssError::Config(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ApiConfig::default())
    }

    /// Look up structured records for a non-empty list of CVE ids.
    ///
    /// Ids not known to the feed are simply absent from the result.
    pub fn lookup_call(&self, cve_ids: &[String], options: &CallOptions) -> Result<LookupResult> {
        if cve_ids.is_empty() {
            return Err(EpssError::Validation(
                "lookup requires at least one CVE id".to_string(),
            ));
        }

        let params = lookup_params(cve_ids, options);
        self.fetch(&params)
    }

    /// Same lookup, returning the serialized payload in `format` instead
    /// of parsed records.
    pub fn generic_lookup_call(&self, cve_ids: &[String], format: OutputFormat) -> Result<String> {
        let result = self.lookup_call(cve_ids, &CallOptions::default())?;
        output::encode_records(&result.scores(), format)
    }

    /// List records matching the given filter.
    ///
    /// An empty record list is a valid result, not an error.
    pub fn list_call(&self, filter: &FilterOptions) -> Result<LookupResult> {
        let params = list_params(filter);
        let mut result = self.fetch(&params)?;

        if let Some(pattern) = &filter.cve_id_pattern {
            let matcher = PatternMatcher::new(pattern)?;
            result.records.retain(|r| matcher.matches(&r.score.cve));
        }

        Ok(result)
    }

    /// Issue a GET against the feed and decode the envelope, retrying
    /// transport failures with exponential backoff.
    fn fetch(&self, params: &[(String, String)]) -> Result<LookupResult> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1));
                std::thread::sleep(delay);
                tracing::debug!("Retry attempt {} after {:?}", attempt, delay);
            }

            match self.fetch_once(params) {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() => {
                    tracing::debug!("Feed request attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            EpssError::transport(
                "feed request",
                TransportErrorKind::Network("unknown error".to_string()),
            )
        }))
    }

    fn fetch_once(&self, params: &[(String, String)]) -> Result<LookupResult> {
        tracing::debug!("GET {} with {:?}", self.config.base_url, params);

        let response = self
            .client
            .get(&self.config.base_url)
            .query(params)
            .send()
            .map_err(|e| network_error("failed to send feed request", &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EpssError::transport(
                "feed request",
                TransportErrorKind::HttpStatus {
                    status: status.as_u16(),
                    body,
                },
            ));
        }

        let envelope: FeedEnvelope = response.json().map_err(|e| {
            EpssError::format(
                "parsing feed envelope",
                FormatErrorKind::InvalidJson(e.to_string()),
            )
        })?;

        if envelope.status_code != 200 {
            return Err(EpssError::transport(
                "feed request",
                TransportErrorKind::FeedStatus {
                    status: envelope.status,
                    code: envelope.status_code,
                },
            ));
        }

        envelope.into_result()
    }
}

/// Build query parameters for an identifier lookup.
fn lookup_params(cve_ids: &[String], options: &CallOptions) -> Vec<(String, String)> {
    let ids = cve_ids
        .iter()
        .map(|id| id.trim().to_uppercase())
        .collect::<Vec<_>>()
        .join(",");

    let mut params = vec![("cve".to_string(), ids)];
    push_common_params(&mut params, options);
    params
}

/// Build query parameters for a filtered listing.
fn list_params(filter: &FilterOptions) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if let Some(score_gt) = filter.score_gt {
        params.push(("epss-gt".to_string(), score_gt.to_string()));
    }
    if let Some(percentile_gt) = filter.percentile_gt {
        params.push(("percentile-gt".to_string(), percentile_gt.to_string()));
    }
    if let Some(days) = filter.days_since_added {
        params.push(("days".to_string(), days.to_string()));
    }
    if let Some(limit) = filter.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(offset) = filter.offset {
        params.push(("offset".to_string(), offset.to_string()));
    }
    push_common_params(&mut params, &filter.options);
    params
}

fn push_common_params(params: &mut Vec<(String, String)>, options: &CallOptions) {
    if let Some(date) = options.date {
        params.push((
            "date".to_string(),
            date.format(FEED_DATE_FORMAT).to_string(),
        ));
    }
    if options.with_history {
        params.push(("scope".to_string(), "time-series".to_string()));
    }
}

/// Case-insensitive CVE id matcher: substring by default, with `*`
/// (any run) and `?` (any one char) wildcards.
pub struct PatternMatcher {
    regex: regex::Regex,
}

impl PatternMatcher {
    /// Compile a pattern. Regex metacharacters other than `*`/`?` are
    /// matched literally.
    pub fn new(pattern: &str) -> Result<Self> {
        let mut expr = String::with_capacity(pattern.len() + 8);
        for ch in pattern.chars() {
            match ch {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                _ => expr.push_str(&regex::escape(&ch.to_string())),
            }
        }

        let regex = regex::RegexBuilder::new(&expr)
            .case_insensitive(true)
            .build()
            .map_err(|e| EpssError::Validation(format!("invalid CVE id pattern: {e}")))?;

        Ok(Self { regex })
    }

    /// Whether a CVE id matches the pattern anywhere.
    #[must_use]
    pub fn matches(&self, cve_id: &str) -> bool {
        self.regex.is_match(cve_id)
    }
}

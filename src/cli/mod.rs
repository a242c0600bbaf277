//! Command handlers for the `epss-tools` binary.
//!
//! The binary's clap definitions live in `main.rs`; this module holds
//! the plain config structs they convert into and the handlers that run
//! them. Handlers return the process exit code: 0 for results, 1 for
//! "nothing found".

use crate::api::{ApiConfig, CallOptions, FilterOptions};
use crate::client::EpssClient;
use crate::error::EpssError;
use crate::model::ScoreWithHistory;
use crate::output::{encode_records, OutputFormat};
use anyhow::{bail, Result};
use chrono::NaiveDate;

/// Exit code: results were found and printed.
pub const EXIT_OK: i32 = 0;
/// Exit code: the query ran but matched nothing.
pub const EXIT_NO_MATCHES: i32 = 1;
/// Exit code: an error occurred.
pub const EXIT_ERROR: i32 = 2;

/// Configuration for the `lookup` command.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// CVE ids to look up (at least one)
    pub cve_ids: Vec<String>,
    /// Score date; latest available when None
    pub date: Option<NaiveDate>,
    /// Attach the historical time series
    pub with_history: bool,
    /// Output serialization format
    pub format: OutputFormat,
    /// Print the raw serialized payload from the generic lookup call
    /// instead of going through the high-level client
    pub raw: bool,
}

/// Configuration for the `list` command.
#[derive(Debug, Clone)]
pub struct ListConfig {
    pub filter: FilterOptions,
    pub with_history: bool,
    pub format: OutputFormat,
}

/// Run the `lookup` command.
pub fn run_lookup(api_config: ApiConfig, config: &LookupConfig) -> Result<i32> {
    let client = EpssClient::new(api_config)?;

    if config.raw {
        let payload = client.api().generic_lookup_call(&config.cve_ids, config.format)?;
        print!("{payload}");
        return Ok(EXIT_OK);
    }

    let mut options = config.date.map_or_else(CallOptions::default, CallOptions::for_date);
    options.with_history = config.with_history;

    let (records, result) = if config.with_history {
        match config.cve_ids.as_slice() {
            // lookup_score_with_history always fetches the latest date
            [only] if config.date.is_none() => match client.lookup_score_with_history(only) {
                Ok((record, result)) => (vec![record], result),
                Err(EpssError::NotFound { cve_id, .. }) => {
                    tracing::warn!("No EPSS data for {cve_id}");
                    return Ok(EXIT_NO_MATCHES);
                }
                Err(e) => return Err(e.into()),
            },
            _ => client.lookup_scores_with_history(&config.cve_ids, &options)?,
        }
    } else {
        let (scores, result) = match config.cve_ids.as_slice() {
            // Single-id lookups go through the convenience call so the
            // NotFound contract is exercised, then degrade to exit 1
            [only] => match client.lookup_score(only, &options) {
                Ok((score, result)) => (vec![score], result),
                Err(EpssError::NotFound { cve_id, .. }) => {
                    tracing::warn!("No EPSS data for {cve_id}");
                    return Ok(EXIT_NO_MATCHES);
                }
                Err(e) => return Err(e.into()),
            },
            // lookup_scores takes no date, so dated batch lookups go
            // through the low-level call
            _ if config.date.is_some() => {
                let result = client.api().lookup_call(&config.cve_ids, &options)?;
                (result.scores(), result)
            }
            _ => client.lookup_scores(&config.cve_ids)?,
        };
        (
            scores.into_iter().map(ScoreWithHistory::without_history).collect(),
            result,
        )
    };

    tracing::debug!(
        "lookup: status={} total={} returned={}",
        result.status,
        result.total,
        records.len()
    );

    if records.is_empty() {
        return Ok(EXIT_NO_MATCHES);
    }

    print_records(&records, config.format, config.with_history)?;
    Ok(EXIT_OK)
}

/// Run the `list` command.
pub fn run_list(api_config: ApiConfig, config: &ListConfig) -> Result<i32> {
    let client = EpssClient::new(api_config)?;

    let (records, result) = if config.with_history {
        client.list_scores_with_history(&config.filter)?
    } else {
        let (scores, result) = client.list_scores(&config.filter)?;
        (
            scores.into_iter().map(ScoreWithHistory::without_history).collect(),
            result,
        )
    };

    tracing::info!(
        "list: status={} total={} returned={}",
        result.status,
        result.total,
        records.len()
    );

    if records.is_empty() {
        return Ok(EXIT_NO_MATCHES);
    }

    print_records(&records, config.format, config.with_history)?;
    Ok(EXIT_OK)
}

/// Print records in the requested format.
///
/// History-bearing records only serialize to JSON and YAML; CSV rows
/// are flat.
fn print_records(records: &[ScoreWithHistory], format: OutputFormat, with_history: bool) -> Result<()> {
    if with_history {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(records)?),
            OutputFormat::Csv => bail!("CSV output does not support --history"),
        }
        return Ok(());
    }

    let scores: Vec<_> = records.iter().map(|r| r.score.clone()).collect();
    print!("{}", encode_records(&scores, format)?);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

//! Serialized output formats for score records.
//!
//! Used by the generic lookup call and the CLI. Encoding and decoding
//! are symmetric: `decode_records(encode_records(scores, f), f)` yields
//! the original records for every format.

use crate::error::{EpssError, FormatErrorKind, Result};
use crate::model::Score;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// CSV with a `cve,epss,percentile,date` header
    Csv,
    /// YAML document
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = EpssError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(EpssError::Validation(format!(
                "unknown output format '{other}' (expected json, csv, or yaml)"
            ))),
        }
    }
}

/// Flat row shape shared by the CSV encoder and decoder.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    cve: String,
    epss: f64,
    percentile: f64,
    date: chrono::NaiveDate,
}

impl From<&Score> for CsvRow {
    fn from(score: &Score) -> Self {
        Self {
            cve: score.cve.clone(),
            epss: score.epss,
            percentile: score.percentile,
            date: score.date,
        }
    }
}

impl From<CsvRow> for Score {
    fn from(row: CsvRow) -> Self {
        Self {
            cve: row.cve,
            epss: row.epss,
            percentile: row.percentile,
            date: row.date,
        }
    }
}

fn serialize_error(format: OutputFormat, message: impl fmt::Display) -> EpssError {
    EpssError::format(
        "encoding records",
        FormatErrorKind::Serialize {
            format: format.to_string(),
            message: message.to_string(),
        },
    )
}

fn decode_error(format: OutputFormat, message: impl fmt::Display) -> EpssError {
    EpssError::format(
        "decoding records",
        FormatErrorKind::InvalidValue {
            field: format.to_string(),
            message: message.to_string(),
        },
    )
}

/// Encode score records in the requested format.
pub fn encode_records(scores: &[Score], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(scores).map_err(|e| serialize_error(format, e))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(scores).map_err(|e| serialize_error(format, e))
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for score in scores {
                writer
                    .serialize(CsvRow::from(score))
                    .map_err(|e| serialize_error(format, e))?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| serialize_error(format, e))?;
            String::from_utf8(bytes).map_err(|e| serialize_error(format, e))
        }
    }
}

/// Decode score records from a serialized payload.
pub fn decode_records(payload: &str, format: OutputFormat) -> Result<Vec<Score>> {
    match format {
        OutputFormat::Json => {
            serde_json::from_str(payload).map_err(|e| decode_error(format, e))
        }
        OutputFormat::Yaml => {
            serde_yaml::from_str(payload).map_err(|e| decode_error(format, e))
        }
        OutputFormat::Csv => {
            let mut reader = csv::Reader::from_reader(payload.as_bytes());
            let mut scores = Vec::new();
            for row in reader.deserialize::<CsvRow>() {
                scores.push(row.map_err(|e| decode_error(format, e))?.into());
            }
            Ok(scores)
        }
    }
}

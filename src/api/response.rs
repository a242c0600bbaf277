//! Raw wire types for the FIRST.org EPSS feed.
//!
//! The feed encodes scores and percentiles as decimal strings
//! (e.g. `"epss": "0.000630000"`) inside a JSON envelope. Conversion to
//! the validated [`crate::model`] types happens here: numeric parsing,
//! range checks, date parsing, and history normalization.

use crate::error::{EpssError, FormatErrorKind, Result};
use crate::model::{HistoryEntry, LookupResult, Score, ScoreWithHistory};
use chrono::NaiveDate;
use serde::Deserialize;

/// Date format used throughout the feed.
pub const FEED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Envelope wrapping every feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEnvelope {
    pub status: String,
    #[serde(rename = "status-code")]
    pub status_code: u16,
    pub version: String,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub data: Vec<FeedRecord>,
}

/// A single record as the feed serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedRecord {
    pub cve: String,
    pub epss: String,
    pub percentile: String,
    pub date: String,
    #[serde(rename = "time-series", default)]
    pub time_series: Vec<FeedObservation>,
}

/// One time-series element (no CVE id, it belongs to the parent record).
#[derive(Debug, Clone, Deserialize)]
pub struct FeedObservation {
    pub epss: String,
    pub percentile: String,
    pub date: String,
}

/// Parse a feed date string.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, FEED_DATE_FORMAT).map_err(|_| {
        EpssError::format(
            "parsing record date",
            FormatErrorKind::InvalidDate {
                value: value.to_string(),
            },
        )
    })
}

/// Parse a decimal-string probability and enforce the [0, 1] invariant.
fn parse_probability(cve_id: &str, field: &str, value: &str) -> Result<f64> {
    let parsed: f64 = value.trim().parse().map_err(|_| {
        EpssError::format(
            "parsing record score",
            FormatErrorKind::InvalidValue {
                field: field.to_string(),
                message: format!("'{value}' is not a number"),
            },
        )
    })?;

    if !(0.0..=1.0).contains(&parsed) {
        return Err(EpssError::format(
            "validating record score",
            FormatErrorKind::ScoreOutOfRange {
                cve_id: cve_id.to_string(),
                field: field.to_string(),
                value: parsed,
            },
        ));
    }

    Ok(parsed)
}

impl FeedRecord {
    /// Convert to a validated record.
    ///
    /// History is sorted ascending by date and duplicate dates dropped
    /// (the feed returns the series newest-first).
    pub fn into_record(self) -> Result<ScoreWithHistory> {
        let score = Score {
            epss: parse_probability(&self.cve, "epss", &self.epss)?,
            percentile: parse_probability(&self.cve, "percentile", &self.percentile)?,
            date: parse_date(&self.date)?,
            cve: self.cve,
        };

        let mut history = Vec::with_capacity(self.time_series.len());
        for obs in self.time_series {
            history.push(HistoryEntry {
                epss: parse_probability(&score.cve, "epss", &obs.epss)?,
                percentile: parse_probability(&score.cve, "percentile", &obs.percentile)?,
                date: parse_date(&obs.date)?,
            });
        }
        history.sort_by_key(|e| e.date);
        history.dedup_by_key(|e| e.date);

        Ok(ScoreWithHistory { score, history })
    }
}

impl FeedEnvelope {
    /// Convert the envelope and all records to the validated model.
    pub fn into_result(self) -> Result<LookupResult> {
        let mut records = Vec::with_capacity(self.data.len());
        for raw in self.data {
            records.push(raw.into_record()?);
        }

        Ok(LookupResult {
            status: self.status,
            status_code: self.status_code,
            version: self.version,
            access: self.access,
            total: self.total,
            offset: self.offset,
            limit: self.limit,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = r#"{
        "status": "OK",
        "status-code": 200,
        "version": "1.0",
        "access": "public, no-cache",
        "total": 1,
        "offset": 0,
        "limit": 100,
        "data": [
            {
                "cve": "CVE-2022-26332",
                "epss": "0.000630000",
                "percentile": "0.252200000",
                "date": "2023-11-24"
            }
        ]
    }"#;

    const WITH_SERIES: &str = r#"{
        "status": "OK",
        "status-code": 200,
        "version": "1.0",
        "total": 1,
        "offset": 0,
        "limit": 100,
        "data": [
            {
                "cve": "CVE-2022-26332",
                "epss": "0.000630000",
                "percentile": "0.252200000",
                "date": "2023-11-24",
                "time-series": [
                    {"epss": "0.000620000", "percentile": "0.251000000", "date": "2023-11-23"},
                    {"epss": "0.000450000", "percentile": "0.119000000", "date": "2022-03-05"},
                    {"epss": "0.000450000", "percentile": "0.119000000", "date": "2022-03-05"},
                    {"epss": "0.000500000", "percentile": "0.140000000", "date": "2023-01-10"}
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_single_record() {
        let envelope: FeedEnvelope = serde_json::from_str(SINGLE).unwrap();
        let result = envelope.into_result().unwrap();

        assert_eq!(result.status, "OK");
        assert_eq!(result.total, 1);
        assert_eq!(result.records.len(), 1);

        let score = &result.records[0].score;
        assert_eq!(score.cve, "CVE-2022-26332");
        assert!((score.epss - 0.00063).abs() < 1e-9);
        assert!((score.percentile - 0.2522).abs() < 1e-9);
        assert_eq!(score.date, NaiveDate::from_ymd_opt(2023, 11, 24).unwrap());
    }

    #[test]
    fn history_sorted_ascending_without_duplicates() {
        let envelope: FeedEnvelope = serde_json::from_str(WITH_SERIES).unwrap();
        let result = envelope.into_result().unwrap();

        let history = &result.records[0].history;
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(
            history[0].date,
            NaiveDate::from_ymd_opt(2022, 3, 5).unwrap()
        );
        assert_eq!(
            history[2].date,
            NaiveDate::from_ymd_opt(2023, 11, 23).unwrap()
        );
    }

    #[test]
    fn rejects_out_of_range_score() {
        let raw = FeedRecord {
            cve: "CVE-2000-0001".to_string(),
            epss: "1.5".to_string(),
            percentile: "0.5".to_string(),
            date: "2023-11-24".to_string(),
            time_series: vec![],
        };
        let err = raw.into_record().unwrap_err();
        assert!(matches!(
            err,
            EpssError::Format {
                source: FormatErrorKind::ScoreOutOfRange { .. },
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_numeric_score() {
        let raw = FeedRecord {
            cve: "CVE-2000-0001".to_string(),
            epss: "n/a".to_string(),
            percentile: "0.5".to_string(),
            date: "2023-11-24".to_string(),
            time_series: vec![],
        };
        let err = raw.into_record().unwrap_err();
        assert!(matches!(
            err,
            EpssError::Format {
                source: FormatErrorKind::InvalidValue { .. },
                ..
            }
        ));
    }

    #[test]
    fn rejects_malformed_date() {
        let raw = FeedRecord {
            cve: "CVE-2000-0001".to_string(),
            epss: "0.1".to_string(),
            percentile: "0.5".to_string(),
            date: "24/11/2023".to_string(),
            time_series: vec![],
        };
        let err = raw.into_record().unwrap_err();
        assert!(matches!(
            err,
            EpssError::Format {
                source: FormatErrorKind::InvalidDate { .. },
                ..
            }
        ));
    }
}

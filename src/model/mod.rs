//! Domain types for EPSS score data.
//!
//! The feed-facing raw types live in [`crate::api::response`]; everything
//! here is already validated: scores and percentiles are in `[0, 1]`,
//! dates are parsed, and history is normalized.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single EPSS observation for one CVE.
///
/// `epss` is the exploitation probability and `percentile` the rank
/// relative to all scored CVEs, both in `[0, 1]`. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// CVE identifier, canonical upper case (e.g. "CVE-2022-26332")
    pub cve: String,
    /// Exploitation probability in [0, 1]
    pub epss: f64,
    /// Percentile rank in [0, 1]
    pub percentile: f64,
    /// Observation date
    pub date: NaiveDate,
}

/// One past observation in a score's time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Exploitation probability in [0, 1]
    pub epss: f64,
    /// Percentile rank in [0, 1]
    pub percentile: f64,
    /// Observation date
    pub date: NaiveDate,
}

/// A score together with its historical time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWithHistory {
    /// The current (or requested-date) observation
    #[serde(flatten)]
    pub score: Score,
    /// Past observations, ascending by date, no duplicate dates.
    ///
    /// Empty when history was not requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
}

impl ScoreWithHistory {
    /// A record with no history attached.
    #[must_use]
    pub const fn without_history(score: Score) -> Self {
        Self {
            score,
            history: Vec::new(),
        }
    }
}

/// Response envelope returned alongside every lookup.
///
/// `total` is the feed-reported match count, which can exceed the number
/// of returned records for paginated or client-side-filtered queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResult {
    /// Feed status string ("OK" on success)
    pub status: String,
    /// Feed status code (200 on success)
    pub status_code: u16,
    /// Feed API version
    pub version: String,
    /// Access/usage notice from the feed, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    /// Total records matching the query on the feed side
    pub total: usize,
    /// Pagination offset
    pub offset: usize,
    /// Pagination limit
    pub limit: usize,
    /// Returned records (history empty unless requested)
    pub records: Vec<ScoreWithHistory>,
}

impl LookupResult {
    /// Records as plain scores, history dropped.
    #[must_use]
    pub fn scores(&self) -> Vec<Score> {
        self.records.iter().map(|r| r.score.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(cve: &str) -> Score {
        Score {
            cve: cve.to_string(),
            epss: 0.00063,
            percentile: 0.2522,
            date: NaiveDate::from_ymd_opt(2023, 11, 24).unwrap(),
        }
    }

    #[test]
    fn score_json_shape() {
        let json = serde_json::to_value(score("CVE-2022-26332")).unwrap();
        assert_eq!(json["cve"], "CVE-2022-26332");
        assert_eq!(json["date"], "2023-11-24");
    }

    #[test]
    fn history_flattens_into_record() {
        let rec = ScoreWithHistory {
            score: score("CVE-2022-26332"),
            history: vec![HistoryEntry {
                epss: 0.00045,
                percentile: 0.119,
                date: NaiveDate::from_ymd_opt(2022, 3, 5).unwrap(),
            }],
        };
        let json = serde_json::to_value(&rec).unwrap();
        // Score fields sit at the top level, not under a nested key
        assert_eq!(json["cve"], "CVE-2022-26332");
        assert_eq!(json["history"][0]["date"], "2022-03-05");
    }

    #[test]
    fn empty_history_is_omitted() {
        let rec = ScoreWithHistory::without_history(score("CVE-2022-26332"));
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("history").is_none());
    }

    #[test]
    fn envelope_scores_drop_history() {
        let result = LookupResult {
            status: "OK".to_string(),
            status_code: 200,
            version: "1.0".to_string(),
            access: None,
            total: 1,
            offset: 0,
            limit: 100,
            records: vec![ScoreWithHistory::without_history(score("CVE-2022-26332"))],
        };
        let scores = result.scores();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].cve, "CVE-2022-26332");
    }
}

//! Property-based tests for score records and the pattern matcher.
//!
//! Ensures the matcher handles arbitrary input without panicking and
//! that output encoding round-trips across all formats for arbitrary
//! valid score lists.

use epss_tools::api::PatternMatcher;
use epss_tools::{decode_records, encode_records, OutputFormat, Score};
use proptest::prelude::*;

prop_compose! {
    fn arb_score()(
        year in 1999u32..2026,
        num in 1u32..100_000,
        epss in 0.0f64..=1.0,
        percentile in 0.0f64..=1.0,
        date_year in 2021i32..2026,
        month in 1u32..=12,
        day in 1u32..=28,
    ) -> Score {
        Score {
            cve: format!("CVE-{year}-{num:04}"),
            epss,
            percentile,
            date: chrono::NaiveDate::from_ymd_opt(date_year, month, day).unwrap(),
        }
    }
}

proptest! {
    #[test]
    fn pattern_matcher_never_panics(pattern in "\\PC{0,64}", id in "\\PC{0,64}") {
        // Compilation may fail for pathological patterns, matching never panics
        if let Ok(matcher) = PatternMatcher::new(&pattern) {
            let _ = matcher.matches(&id);
        }
    }

    #[test]
    fn wildcard_star_matches_own_prefix(id in "CVE-[0-9]{4}-[0-9]{4,5}", cut in 0usize..8) {
        let cut = cut.min(id.len());
        let pattern = format!("{}*", &id[..cut]);
        let matcher = PatternMatcher::new(&pattern).unwrap();
        prop_assert!(matcher.matches(&id));
    }

    #[test]
    fn encode_decode_round_trips(scores in prop::collection::vec(arb_score(), 0..20)) {
        for format in [OutputFormat::Json, OutputFormat::Csv, OutputFormat::Yaml] {
            let encoded = encode_records(&scores, format).unwrap();
            let decoded = decode_records(&encoded, format).unwrap();
            prop_assert_eq!(&decoded, &scores, "round-trip mismatch for {}", format);
        }
    }
}

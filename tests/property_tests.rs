//! Property-based tests for parser and aggregation invariants.
//!
//! Tests validate:
//! 1. Well-formed lines parse back to their endpoint and duration
//! 2. The parser never panics on arbitrary input
//! 3. Finalized counts and count shares add up to the totals
//! 4. `time_max` bounds every observed sample
//! 5. The error-rate gate trips exactly when bad lines outnumber good ones

use log_analyzer::model::{EndpointTable, RequestLine};
use log_analyzer::parser::parse_line;
use log_analyzer::source::LineStream;
use proptest::prelude::*;
use std::io::Cursor;

fn access_line(path: &str, duration: &str) -> String {
    format!(
        r#"1.196.116.32 -  - [29/Jun/2017:03:50:22 +0300] "GET {} HTTP/1.1" 200 927 "-" "Lynx/2.8.8dev.9" "-" "1498697422-2190034393-4708-9752759" "dc7161be3" {}"#,
        path, duration
    )
}

fn endpoint() -> impl Strategy<Value = String> {
    "/[a-z0-9_/]{0,30}"
}

fn duration() -> impl Strategy<Value = (u32, u32)> {
    (0u32..100, 0u32..1000)
}

// ===== Property 1: Parsing well-formed lines =====

proptest! {
    #[test]
    fn well_formed_line_yields_endpoint_and_duration(
        path in endpoint(),
        (secs, millis) in duration(),
    ) {
        let text = format!("{}.{:03}", secs, millis);
        let line = access_line(&path, &text);

        let record = parse_line(&line);
        prop_assert!(record.is_some(), "Line should parse: {}", line);
        let record = record.unwrap();

        prop_assert_eq!(record.endpoint_key(), path.as_str());
        prop_assert_eq!(record.request_time, text.parse::<f64>().unwrap());
    }

    #[test]
    fn parser_never_panics(line in any::<String>()) {
        let _ = parse_line(&line);
    }

    #[test]
    fn endpoint_key_falls_back_to_first_token(token in "[A-Za-z0-9/]{1,20}") {
        let request = RequestLine::new(token.clone());
        prop_assert_eq!(request.endpoint_key(), token.as_str());
    }
}

// ===== Property 2: Aggregation invariants =====

proptest! {
    #[test]
    fn counts_and_count_shares_add_up(
        samples in prop::collection::vec((0usize..5, 1u32..5000), 1..200),
    ) {
        let keys = ["/a", "/b", "/c", "/d", "/e"];
        let mut table = EndpointTable::new();
        for (key, millis) in &samples {
            table.record_sample(keys[*key], f64::from(*millis) / 1000.0);
        }
        prop_assert_eq!(table.totals().total_count, samples.len() as u64);

        let rows = table.finalize().unwrap();
        let count: u64 = rows.iter().map(|row| row.count).sum();
        prop_assert_eq!(count, samples.len() as u64);

        let perc: f64 = rows.iter().map(|row| row.count_perc).sum();
        let tolerance = 0.0005 * rows.len() as f64 + 1e-9;
        prop_assert!((perc - 100.0).abs() <= tolerance, "count_perc sums to {}", perc);
    }

    #[test]
    fn time_max_bounds_every_sample(
        millis in prop::collection::vec(0u32..10_000, 1..100),
    ) {
        let mut table = EndpointTable::new();
        for m in &millis {
            table.record_sample("/api", f64::from(*m) / 1000.0);
        }

        let stats = table.get("/api").unwrap();
        let largest = millis.iter().copied().max().unwrap();
        prop_assert_eq!(stats.time_max, f64::from(largest) / 1000.0);
        prop_assert_eq!(stats.count, millis.len() as u64);
    }

    #[test]
    fn keys_keep_first_appearance_order(
        order in prop::collection::vec(0usize..6, 1..60),
    ) {
        let keys = ["/a", "/b", "/c", "/d", "/e", "/f"];
        let mut table = EndpointTable::new();
        let mut expected: Vec<&str> = Vec::new();
        for i in &order {
            table.record_sample(keys[*i], 0.1);
            if !expected.contains(&keys[*i]) {
                expected.push(keys[*i]);
            }
        }

        let rows = table.finalize().unwrap();
        let urls: Vec<&str> = rows.iter().map(|row| row.url.as_str()).collect();
        prop_assert_eq!(urls, expected);
    }
}

// ===== Property 3: Error-rate gate =====

proptest! {
    #[test]
    fn gate_trips_only_when_bad_lines_outnumber_good(good in 0usize..40, bad in 0usize..40) {
        let mut lines = Vec::new();
        lines.extend((0..good).map(|i| access_line(&format!("/api/{}", i), "0.100")));
        lines.extend((0..bad).map(|i| format!("garbage line {}", i)));
        let input = lines.join("\n");

        let mut stream = LineStream::from_reader(Cursor::new(input.into_bytes()), "prop", None);
        let parsed = stream.by_ref().filter(|r| r.is_ok()).count();
        prop_assert_eq!(parsed, good);

        let result = stream.finish();
        prop_assert_eq!(result.is_err(), bad > good);
    }
}

use callprof::aggregator::to_report;
use callprof::events::{read_event_log, replay_events, validate_events};
use callprof::flamegraph::{generate_flamegraph, FlamegraphConfig};
use callprof::output::{read_report, write_report};
use callprof::tracker::FilterPolicy;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_log(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_full_pipeline_jsonl_to_report() {
    let log = write_log(&[
        r#"{"event":"enter","function":"main","ts_ms":0.0}"#,
        r#"{"event":"enter","function":"fib","ts_ms":1.0}"#,
        r#"{"event":"enter","function":"fib","ts_ms":2.0}"#,
        r#"{"event":"exit","function":"fib","ts_ms":4.0}"#,
        r#"{"event":"exit","function":"fib","ts_ms":7.0}"#,
        r#"{"event":"exit","function":"main","ts_ms":10.0}"#,
    ]);

    let events = read_event_log(log.path()).unwrap();
    validate_events(&events).unwrap();

    let outcome = replay_events(&events, &FilterPolicy::All, None);
    assert_eq!(outcome.anomaly_count, 0);
    assert_eq!(outcome.events_replayed, 6);

    let fib = outcome.aggregator.snapshot("fib").unwrap();
    assert_eq!(fib.invocation_count, 2);
    assert!((fib.cumulative_duration_ms - 8.0).abs() < 1e-9); // 2ms inner + 6ms outer
    assert!((fib.last_duration_ms - 6.0).abs() < 1e-9);

    let main = outcome.aggregator.snapshot("main").unwrap();
    assert_eq!(main.invocation_count, 1);
    assert!((main.cumulative_duration_ms - 10.0).abs() < 1e-9);

    // Report is ranked by cumulative duration
    let report = to_report(&outcome.aggregator, "test", outcome.anomaly_count, 10);
    assert_eq!(report.functions[0].name, "main");
    assert_eq!(report.functions[1].name, "fib");
    assert_eq!(report.total_calls, 3);
}

#[test]
fn test_json_array_log_format() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"event":"enter","function":"fib","ts_ms":0.0}},
            {{"event":"exit","function":"fib","ts_ms":5.0}}
        ]"#
    )
    .unwrap();
    file.flush().unwrap();

    let events = read_event_log(file.path()).unwrap();
    assert_eq!(events.len(), 2);

    let outcome = replay_events(&events, &FilterPolicy::All, None);
    let stats = outcome.aggregator.snapshot("fib").unwrap();
    assert!((stats.last_duration_ms - 5.0).abs() < 1e-9);
}

#[test]
fn test_tracked_subset_filters_report() {
    let log = write_log(&[
        r#"{"event":"enter","function":"fib","ts_ms":0.0}"#,
        r#"{"event":"enter","function":"helper","ts_ms":1.0}"#,
        r#"{"event":"exit","function":"helper","ts_ms":2.0}"#,
        r#"{"event":"exit","function":"fib","ts_ms":5.0}"#,
    ]);

    let events = read_event_log(log.path()).unwrap();
    let outcome = replay_events(&events, &FilterPolicy::names(["fib"]), None);

    assert!(outcome.aggregator.snapshot("helper").is_none());
    assert_eq!(outcome.aggregator.len(), 1);
}

#[test]
fn test_report_round_trips_through_file() {
    let log = write_log(&[
        r#"{"event":"enter","function":"fib","ts_ms":0.0}"#,
        r#"{"event":"exit","function":"fib","ts_ms":5.0}"#,
    ]);

    let events = read_event_log(log.path()).unwrap();
    let outcome = replay_events(&events, &FilterPolicy::All, None);
    let report = to_report(&outcome.aggregator, "events.jsonl", 0, 10);

    let out = NamedTempFile::new().unwrap();
    write_report(&report, out.path()).unwrap();
    let loaded = read_report(out.path()).unwrap();

    assert_eq!(loaded.total_calls, report.total_calls);
    assert_eq!(loaded.functions.len(), report.functions.len());
    assert_eq!(loaded.functions[0].name, "fib");
}

#[test]
fn test_flamegraph_from_replayed_stacks() {
    let log = write_log(&[
        r#"{"event":"enter","function":"main","ts_ms":0.0}"#,
        r#"{"event":"enter","function":"fib","ts_ms":2.0}"#,
        r#"{"event":"exit","function":"fib","ts_ms":5.0}"#,
        r#"{"event":"exit","function":"main","ts_ms":10.0}"#,
    ]);

    let events = read_event_log(log.path()).unwrap();
    let outcome = replay_events(&events, &FilterPolicy::All, None);

    assert_eq!(outcome.stacks.len(), 2);

    let config = FlamegraphConfig::new().with_title("replay");
    let svg = generate_flamegraph(&outcome.stacks, Some(&config)).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("fib"));
}

#[test]
fn test_unbalanced_log_reports_anomalies() {
    // Exit without enter, then enter without exit
    let log = write_log(&[
        r#"{"event":"exit","function":"phantom","ts_ms":0.0}"#,
        r#"{"event":"enter","function":"leaky","ts_ms":1.0}"#,
    ]);

    let events = read_event_log(log.path()).unwrap();
    let outcome = replay_events(&events, &FilterPolicy::All, None);

    assert_eq!(outcome.anomaly_count, 2);
    assert!(outcome.aggregator.is_empty());
}

#[test]
fn test_validation_rejects_backward_clock() {
    let log = write_log(&[
        r#"{"event":"enter","function":"fib","ts_ms":5.0}"#,
        r#"{"event":"exit","function":"fib","ts_ms":1.0}"#,
    ]);

    let events = read_event_log(log.path()).unwrap();
    assert!(validate_events(&events).is_err());
}

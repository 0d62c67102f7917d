//! Recorder lifecycle and format tests
//!
//! Verifies the dump sentinel, exact line formats, the disable window,
//! capacity checking, and the documented end-to-end scenario.

#![cfg(feature = "recording")]

use std::sync::{Arc, Mutex};

use test_case::test_case;

use memledger::ledger::EMPTY_LOG;
use memledger::{Ledger, LedgerConfig, LedgerError, Severity, Sink, Site, Token};

#[test]
fn test_dump_sentinel_before_first_record() {
    let ledger = Ledger::new(LedgerConfig::default());
    assert_eq!(ledger.dump(), EMPTY_LOG);
    assert_eq!(ledger.allocation_count(), Some(0));
    assert_eq!(ledger.free_count(), Some(0));
}

#[test]
fn test_single_alloc_line_format() {
    let ledger = Ledger::new(LedgerConfig::default());
    ledger
        .record_alloc_at(128, Token::new(0x1000), Site::new("f.c", 10))
        .unwrap();

    assert_eq!(ledger.dump(), "0x00001000 - alloc: 128 bytes (f.c@10)\n");
}

#[test]
fn test_implicit_site_captures_caller() {
    let ledger = Ledger::new(LedgerConfig::default());
    let line = line!() + 1;
    ledger.record_alloc(64, Token::new(0xbeef)).unwrap();

    let expected = format!("0x0000beef - alloc: 64 bytes ({}@{})\n", file!(), line);
    assert_eq!(ledger.dump(), expected);
}

#[test]
fn test_end_to_end_scenario() {
    // init; alloc 128 @ 0x1000; acquire "socket" @ 0x2000; free 0x1000.
    let ledger = Ledger::new(LedgerConfig::default());
    ledger
        .record_alloc_at(128, Token::new(0x1000), Site::new("f.c", 10))
        .unwrap();
    ledger
        .record_resource_alloc_at("socket", Token::new(0x2000), Site::new("f.c", 12))
        .unwrap();
    ledger.record_free_at(Token::new(0x1000), Site::new("f.c", 20));

    let dump = ledger.dump();
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(
        lines,
        vec![
            "0x00001000 - alloc: 128 bytes (f.c@10)",
            "0x00002000 - socket: resource acquired (f.c@12)",
            "0x00001000 - free: memory freed (f.c@20)",
        ],
        "log must hold one line per event in call order"
    );

    assert_eq!(ledger.allocation_count(), Some(2));
    assert_eq!(ledger.free_count(), Some(1));
    assert_eq!(ledger.live_tokens(), vec![Token::new(0x2000)]);
}

#[test]
fn test_untracked_free_is_reported_not_fatal() {
    let ledger = Ledger::new(LedgerConfig::default());
    ledger.record_free_at(Token::new(0xdead), Site::new("f.c", 30));

    assert_eq!(ledger.free_count(), Some(1));
    let dump = ledger.dump();
    assert_eq!(
        dump.matches("free error").count(),
        1,
        "exactly one anomaly line"
    );
    assert!(dump.contains("0x0000dead - free error: untracked identity (f.c@30)"));
}

#[test]
fn test_untracked_resource_free_reported_symmetrically() {
    // Resource releases get the same anomaly reporting as heap frees.
    let ledger = Ledger::new(LedgerConfig::default());
    ledger.record_resource_free_at("thread", Token::new(0x77), Site::new("f.c", 40));

    assert_eq!(ledger.free_count(), Some(1));
    let dump = ledger.dump();
    assert!(dump.contains("0x00000077 - thread: resource released (f.c@40)"));
    assert!(dump.contains("0x00000077 - free error: untracked identity (f.c@40)"));
}

#[test]
fn test_double_free_reports_second_only() {
    let ledger = Ledger::new(LedgerConfig::default());
    let token = Token::new(0x42);
    ledger.record_alloc(8, token).unwrap();
    ledger.record_free(token);
    ledger.record_free(token);

    assert_eq!(ledger.free_count(), Some(2));
    assert_eq!(ledger.dump().matches("free error").count(), 1);
    assert_eq!(ledger.live_count(), 0);
}

#[test]
fn test_disable_window_leaves_no_trace() {
    let ledger = Ledger::new(LedgerConfig::default());
    let kept = Token::new(0x1);
    ledger.record_alloc(4, kept).unwrap();

    ledger.disable();
    ledger.record_alloc(4, Token::new(0x2)).unwrap();
    ledger.record_free(kept);
    ledger.record_resource_alloc("socket", Token::new(0x3)).unwrap();
    ledger.enable();

    assert_eq!(ledger.allocation_count(), Some(1));
    assert_eq!(ledger.free_count(), Some(0));
    assert_eq!(ledger.live_tokens(), vec![kept]);
    assert_eq!(
        ledger.dump().lines().count(),
        1,
        "suppressed calls must not appear in the dump"
    );
}

#[test_case(1)]
#[test_case(4)]
#[test_case(16)]
fn test_capacity_limit_is_checked(capacity: usize) {
    let ledger = Ledger::new(LedgerConfig::with_capacity(capacity));
    for i in 0..capacity {
        ledger.record_alloc(8, Token::new(i as u64 + 1)).unwrap();
    }

    let overflow = ledger.record_alloc(8, Token::new(0x9999));
    assert_eq!(overflow, Err(LedgerError::CapacityExceeded { capacity }));
    assert_eq!(ledger.live_count(), capacity, "overflow identity not stored");
    assert!(ledger.dump().contains("alloc error: live table full"));

    // Freeing one identity makes room again.
    ledger.record_free(Token::new(1));
    ledger.record_alloc(8, Token::new(0x9999)).unwrap();
}

#[test]
fn test_realloc_of_live_identity_passes_full_table() {
    // An identity already in the table is not a new occupant.
    let ledger = Ledger::new(LedgerConfig::with_capacity(1));
    let token = Token::new(0xaa);
    ledger.record_alloc(8, token).unwrap();
    ledger.record_alloc(16, token).unwrap();
    assert_eq!(ledger.live_count(), 1);
}

#[test]
fn test_quit_returns_accumulated_log() {
    let ledger = Ledger::new(LedgerConfig::default());
    ledger
        .record_alloc_at(32, Token::new(0x5), Site::new("f.c", 1))
        .unwrap();

    let report = ledger.quit();
    assert!(report.contains("0x00000005 - alloc: 32 bytes (f.c@1)"));
}

#[test]
fn test_quit_on_untouched_ledger_returns_sentinel() {
    let ledger = Ledger::new(LedgerConfig::default());
    assert_eq!(ledger.quit(), EMPTY_LOG);
}

#[test]
fn test_sink_mirrors_records_with_severities() {
    let seen: Arc<Mutex<Vec<(Severity, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_log = Arc::clone(&seen);
    let sink = Sink::callback(move |severity, _site, message| {
        sink_log.lock().unwrap().push((severity, message.to_string()));
    });

    let ledger = Ledger::new(LedgerConfig::default().sink(sink));
    let token = Token::new(0xc0);
    ledger.record_alloc(8, token).unwrap();
    ledger.record_free(token);
    ledger.record_free(token);

    let seen = seen.lock().unwrap();
    let severities: Vec<Severity> = seen.iter().map(|(severity, _)| *severity).collect();
    assert_eq!(
        severities,
        vec![
            Severity::Debug,
            Severity::Debug,
            Severity::Debug,
            Severity::Warning,
        ],
        "three records plus one anomaly"
    );
    assert!(seen[3].1.contains("free error"));
}

#[test]
fn test_file_sink_appends() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("memledger-sink-{}.log", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let ledger = Ledger::new(LedgerConfig::default().sink(Sink::file(&path)?));
    ledger.record_alloc_at(32, Token::new(0xf11e), Site::new("f.c", 7))?;
    drop(ledger);

    let contents = std::fs::read_to_string(&path)?;
    std::fs::remove_file(&path)?;
    assert!(contents.contains("DEBUG:f.c@7: 0x0000f11e - alloc: 32 bytes (f.c@7)"));
    Ok(())
}

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use chrono::NaiveDate;
use tempfile::tempdir;
use xml_sheets::events::EventLog;
use xml_sheets::session::Session;
use xml_sheets::sync;

fn fixed_log() -> EventLog {
    EventLog::with_clock(|| {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|date| date.and_hms_opt(7, 5, 3))
            .expect("valid timestamp")
    })
}

#[test]
fn events_are_prefixed_with_a_timestamp() {
    let mut log = fixed_log();
    log.log_event("Test Event");
    assert_eq!(log.entries(), ["[2024-03-09 07:05:03] Test Event"]);
}

#[test]
fn each_event_appends_exactly_one_entry_in_call_order() {
    let mut log = EventLog::new();
    for i in 0..5 {
        log.log_event(format!("Event {i}"));
        assert_eq!(log.entries().len(), i + 1);
        assert!(log.entries()[i].ends_with(&format!(" Event {i}")));
    }
}

#[test]
fn errors_are_stored_with_and_without_timestamp() {
    let mut log = fixed_log();
    log.log_error("X");

    assert_eq!(log.entries().last().map(String::as_str), Some("[2024-03-09 07:05:03] X"));
    assert_eq!(log.errors().last().map(String::as_str), Some("X"));
    assert_eq!(log.latest_error(), "X");
}

#[test]
fn latest_error_returns_the_last_one() {
    let mut log = EventLog::new();
    for i in 0..5 {
        log.log_error(format!("Error {i}"));
    }
    log.log_event("not an error");

    assert_eq!(log.latest_error(), "Error 4");
    assert_eq!(log.errors().len(), 5);
}

#[test]
fn latest_error_is_empty_when_nothing_failed() {
    let log = EventLog::new();
    assert_eq!(log.latest_error(), "");
}

#[test]
fn listeners_receive_every_composed_entry() {
    let mut log = fixed_log();
    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&first);
    log.add_listener(move |entry| sink.borrow_mut().push(entry.to_string()));
    let sink = Rc::clone(&second);
    log.add_listener(move |entry| sink.borrow_mut().push(entry.to_string()));

    for i in 0..5 {
        log.log_event(format!("Event {i}"));
    }
    log.log_error("Broken");

    assert_eq!(log.entries(), first.borrow().as_slice());
    assert_eq!(log.entries(), second.borrow().as_slice());
}

#[test]
fn removed_listeners_stop_receiving_entries() {
    let mut log = EventLog::new();
    let seen = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&seen);
    let id = log.add_listener(move |_| *counter.borrow_mut() += 1);

    log.log_event("one");
    assert!(log.remove_listener(id));
    log.log_event("two");

    assert_eq!(*seen.borrow(), 1);
}

#[test]
fn saved_log_has_one_line_per_entry_and_no_trailing_newline() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("log.txt");
    let mut log = EventLog::new();
    for i in 0..5 {
        log.log_event(format!("Event {i}"));
    }
    let at_save = log.entries().to_vec();

    log.save_log(&path).expect("log saved");

    let written = fs::read_to_string(&path).expect("log read");
    assert!(!written.ends_with('\n'));
    let lines: Vec<&str> = written.split('\n').collect();
    assert_eq!(lines, at_save);
    assert!(
        log.entries()
            .last()
            .is_some_and(|entry| entry.contains("Log saved:"))
    );
    assert_eq!(log.entries().len(), at_save.len() + 1);
}

#[test]
fn saving_an_empty_log_writes_an_empty_file() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("log.txt");
    let mut log = EventLog::new();

    log.save_log(&path).expect("log saved");

    let written = fs::read_to_string(&path).expect("log read");
    assert_eq!(written, "");
    assert_eq!(written.split('\n').collect::<Vec<_>>(), vec![""]);
}

#[test]
fn saving_overwrites_existing_content() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("log.txt");
    fs::write(&path, "stale\nstale\nstale\n").expect("stale file written");
    let mut log = fixed_log();
    log.log_event("fresh");

    log.save_log(&path).expect("log saved");

    let written = fs::read_to_string(&path).expect("log read");
    assert_eq!(written, "[2024-03-09 07:05:03] fresh");
}

#[test]
fn write_failures_are_surfaced() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("missing-dir").join("log.txt");
    let mut log = EventLog::new();
    log.log_event("entry");

    let error = log.save_log(&path).unwrap_err();

    assert!(matches!(error.kind(), xml_sheets::ErrorKind::Io(_)));
    assert_eq!(log.entries().len(), 1);
}

#[test]
fn session_save_appends_the_text_extension_and_logs_failures() {
    let temp_dir = tempdir().expect("temporary directory");
    let mut session = Session::with_log(fixed_log());
    session.log.log_event("entry");

    let written = sync::save_log(&mut session, &temp_dir.path().join("session"))
        .expect("log saved");
    assert_eq!(written, temp_dir.path().join("session.txt"));
    assert_eq!(
        fs::read_to_string(&written).expect("log read"),
        "[2024-03-09 07:05:03] entry\n[2024-03-09 07:05:03] Save as ".to_string()
            + &written.display().to_string()
    );

    let unwritable = temp_dir.path().join("missing-dir").join("log");
    sync::save_log(&mut session, &unwritable).unwrap_err();
    assert!(session.log.latest_error().contains("Error while saving the log file"));
}

#[test]
fn clearing_resets_entries_and_errors() {
    let mut log = EventLog::new();
    log.log_error("boom");
    log.clear();

    assert!(log.entries().is_empty());
    assert!(log.errors().is_empty());
    assert_eq!(log.latest_error(), "");
}

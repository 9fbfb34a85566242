//! Simulate specs
//!
//! Verify that a simulated broker records exactly what its listener receives.

use crate::prelude::*;

#[test]
fn every_event_is_recorded() {
    let temp = Project::empty();

    temp.evboard()
        .args(&[
            "simulate", "--out", "run.evb", "--senders", "2", "--events", "25", "--interval",
            "2ms", "--names", "names.txt",
        ])
        .passes()
        .stdout_eq("published 50 events from 2 senders\nrecorded 50 events to run.evb\n");

    let out = temp
        .evboard()
        .args(&[
            "show", "run.evb", "--names", "names.txt", "--sender", "sensor1", "-o", "json",
        ])
        .passes()
        .stdout();
    assert_eq!(out.lines().count(), 25);
}

#[test]
fn listener_address_and_state_filter_apply() {
    let temp = Project::empty();

    // sensor0 publishes offset at k = 2, 5, ..., 23; k % 4 == 0 has no duration
    temp.evboard()
        .args(&[
            "simulate",
            "--out",
            "offsets.txt",
            "--events",
            "25",
            "--format",
            "ascii",
            "--address",
            "sensor0:offset",
            "--state",
            "nonzerodur",
        ])
        .passes()
        .stdout_has("recorded 6 events to offsets.txt");

    let text = String::from_utf8(temp.read("offsets.txt")).unwrap();
    assert!(text.starts_with("#evboard ascii v2\n"));
    assert_eq!(text.lines().count(), 7);
}

#[test]
fn unknown_address_name_fails() {
    let temp = Project::empty();
    temp.evboard()
        .args(&["simulate", "--out", "run.evb", "--address", "camera"])
        .fails()
        .stderr_has("unresolved name 'camera'");
}

#[test]
fn config_file_limits_apply() {
    let temp = Project::empty();
    temp.file("broker.toml", "max_listeners = 0\n");

    temp.evboard()
        .args(&["simulate", "--out", "run.evb", "--config", "broker.toml"])
        .fails()
        .stderr_has("exceeds available space");
}

#[test]
fn default_config_is_read_from_config_dir() {
    let temp = Project::empty();
    temp.file(".config/evboard/broker.toml", "max_senders = 1\n");
    temp.file(
        "Library/Application Support/evboard/broker.toml",
        "max_senders = 1\n",
    );

    temp.evboard()
        .args(&["simulate", "--out", "run.evb", "--senders", "2"])
        .fails()
        .stderr_has("#sender exceeds available space '1'");
}

#[test]
fn log_file_receives_broker_logs() {
    let temp = Project::empty();

    temp.evboard()
        .env("RUST_LOG", "info")
        .args(&[
            "simulate",
            "--out",
            "run.evb",
            "--events",
            "5",
            "--log-file",
            "logs/sim.log",
        ])
        .passes();

    let log = String::from_utf8(temp.read("logs/sim.log")).unwrap();
    assert!(log.contains("start event board worker"));
    assert!(log.contains("'sensor0' sends"));
}

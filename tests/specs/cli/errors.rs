//! CLI error specs
//!
//! Verify that bad input fails with a useful message.

use crate::prelude::*;

#[test]
fn missing_log_fails() {
    let temp = Project::empty();
    temp.evboard()
        .args(&["show", "missing.evb"])
        .fails()
        .stderr_has("IO error");
}

#[test]
fn foreign_file_is_not_a_log() {
    let temp = Project::empty();
    temp.file("notes.txt", "shopping list\n");
    temp.evboard()
        .args(&["show", "notes.txt"])
        .fails()
        .stderr_has("not an event log");
}

#[test]
fn unknown_state_filter_is_rejected() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);
    temp.evboard()
        .args(&["show", "log.txt", "--state", "finished"])
        .fails()
        .stderr_has("unknown state filter");
}

#[test]
fn sender_name_needs_a_name_table() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);
    temp.evboard()
        .args(&["show", "log.txt", "--sender", "audio"])
        .fails()
        .stderr_has("unknown name 'audio'");
}

#[test]
fn unsupported_format_version_is_rejected() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);
    temp.evboard()
        .args(&["convert", "log.txt", "out.evb", "--format-version", "3"])
        .fails();
}

#[test]
fn corrupt_record_is_reported() {
    let temp = Project::empty();
    temp.file(
        "log.txt",
        "#evboard ascii v1\n0\t0\t100\t0\tcompleted\tempty\t\n0\t0\tsoon\t0\tcompleted\tempty\t\n",
    );
    temp.evboard()
        .args(&["show", "log.txt"])
        .fails()
        .stderr_has("corrupted record 1");
}

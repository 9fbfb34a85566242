//! Convert specs
//!
//! Verify conversion between formats and versions.

use crate::prelude::*;

#[test]
fn ascii_converts_to_binary() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);

    temp.evboard()
        .args(&["convert", "log.txt", "log.evb"])
        .passes()
        .stdout_eq("converted 4 events (ascii v2 -> binary v2)\n");

    assert_eq!(&temp.read("log.evb")[..6], b"EVB\0\x02\x00");
    temp.evboard()
        .args(&["show", "log.evb", "--state", "continued"])
        .passes()
        .stdout_has("000\ttuple\t#0\t#1\t150\t20\t8\tcontinued");
}

#[test]
fn v1_output_drops_glue_and_probability() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);

    temp.evboard()
        .args(&["convert", "log.txt", "old.evb", "--format-version", "1"])
        .passes()
        .stdout_eq("converted 4 events (ascii v2 -> binary v1)\n");
    assert_eq!(&temp.read("old.evb")[..6], b"EVB\0\x01\x00");

    temp.evboard()
        .args(&["convert", "old.evb", "back.txt", "--format", "ascii"])
        .passes()
        .stdout_eq("converted 4 events (binary v1 -> ascii v2)\n");

    let text = String::from_utf8(temp.read("back.txt")).unwrap();
    assert!(text.starts_with("#evboard ascii v2\n"));
    assert!(text.contains("1\t0\t200\t0\tcompleted\tstring\t-\t1\t\"laughter\"\n"));
}

#[test]
fn round_trip_keeps_events() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);

    temp.evboard()
        .args(&["convert", "log.txt", "a.evb"])
        .passes();
    temp.evboard()
        .args(&["convert", "a.evb", "b.txt", "--format", "ascii"])
        .passes();

    let text = String::from_utf8(temp.read("b.txt")).unwrap();
    similar_asserts::assert_eq!(text, SAMPLE_LOG);
}

#[test]
fn output_directories_are_created() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);

    temp.evboard()
        .args(&["convert", "log.txt", "nested/dir/log.evb"])
        .passes();
    assert!(temp.path().join("nested/dir/log.evb").exists());
}

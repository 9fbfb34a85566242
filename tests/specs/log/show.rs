//! Show specs
//!
//! Verify filtering and printing of stored logs.

use crate::prelude::*;

const HEADER: &str = "#\ttype\tsender\tevent\ttime\tdur\tsize\tstate\n\
----------------------------------------------------------------\n";

#[test]
fn show_prints_every_event() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);

    let expected = format!(
        "{}{}",
        HEADER,
        "000\tempty\t#0\t#0\t100\t0\t0\tcompleted\n\
         001\ttuple\t#0\t#1\t150\t20\t8\tcontinued\n\
         002\tstring\t#1\t#0\t200\t0\t8\tcompleted\n\
         003\tmap\t#1\t#1\t900\t40\t16\tcompleted\n"
    );
    temp.evboard().args(&["show", "log.txt"]).passes().stdout_eq(&expected);
}

#[test]
fn show_resolves_names_from_table() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);
    temp.file("names.txt", SAMPLE_NAMES);

    temp.evboard()
        .args(&["show", "log.txt", "--names", "names.txt", "--sender", "vad"])
        .passes()
        .stdout_has("000\tstring\tvad\taudio\t200\t0\t8\tcompleted")
        .stdout_has("001\tmap\tvad\tvad\t900\t40\t16\tcompleted")
        .stdout_lacks("002");
}

#[test]
fn show_filters_by_state() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);

    let expected = format!("{}000\ttuple\t#0\t#1\t150\t20\t8\tcontinued\n", HEADER);
    temp.evboard()
        .args(&["show", "log.txt", "--state", "continued"])
        .passes()
        .stdout_eq(&expected);
}

#[test]
fn show_filters_by_sender_and_event_id() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);

    temp.evboard()
        .args(&["show", "log.txt", "--sender", "1", "--event", "0"])
        .passes()
        .stdout_has("000\tstring\t#1\t#0\t200")
        .stdout_lacks("001");
}

#[test]
fn span_is_relative_to_latest_event() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);

    temp.evboard()
        .args(&["show", "log.txt", "--span", "100"])
        .passes()
        .stdout_has("000\tmap\t#1\t#1\t900")
        .stdout_lacks("001");
}

#[test]
fn span_with_reference_time_excludes_later_events() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);

    temp.evboard()
        .args(&["show", "log.txt", "--span", "100", "--at", "200"])
        .passes()
        .stdout_has("\t100\t")
        .stdout_has("\t150\t")
        .stdout_has("\t200\t")
        .stdout_lacks("\t900\t");
}

#[test]
fn json_output_is_one_event_per_line() {
    let temp = Project::empty();
    temp.file("log.txt", SAMPLE_LOG);
    temp.file("names.txt", SAMPLE_NAMES);

    let out = temp
        .evboard()
        .args(&["show", "log.txt", "--names", "names.txt", "-o", "json"])
        .passes()
        .stdout_has("\"sender\":\"vad\"")
        .stdout_has("\"glue_id\":3")
        .stdout_has("\"value\":\"laughter\"")
        .stdout();
    assert_eq!(out.lines().count(), 4);
}

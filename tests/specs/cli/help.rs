//! CLI help specs
//!
//! Verify the top-level help and version output.

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();
    temp.evboard()
        .args(&["--help"])
        .passes()
        .stdout_has("show")
        .stdout_has("convert")
        .stdout_has("simulate");
}

#[test]
fn version_is_printed() {
    let temp = Project::empty();
    temp.evboard()
        .args(&["--version"])
        .passes()
        .stdout_has("evboard 0.1.0");
}

#[test]
fn simulate_help_documents_listener_options() {
    let temp = Project::empty();
    temp.evboard()
        .args(&["simulate", "--help"])
        .passes()
        .stdout_has("--address")
        .stdout_has("--span")
        .stdout_has("--interval");
}

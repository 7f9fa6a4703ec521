//! Exit codes and error messages.

mod common;

use common::Workspace;
use predicates::prelude::*;

#[test]
fn missing_template_dir_exits_three() {
    let ws = Workspace::new();
    ws.generate_with("shop", "no-such-dir", "out")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("template directory not found"))
        .stderr(predicate::str::contains("Suggestions:"));
}

#[test]
fn empty_template_dir_is_rejected() {
    let ws = Workspace::new();
    std::fs::create_dir_all(ws.path("templates/.git")).unwrap();
    ws.generate("shop").assert().code(2);
    assert!(!ws.path("out").exists());
}

#[test]
fn missing_api_key_exits_four() {
    let ws = Workspace::new();
    ws.write("templates/main.tf", "# {{name}}\n");
    ws.infraplate()
        .args(["generate", "blueprint", "shop", "-t", "templates"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("No API key configured"))
        .stderr(predicate::str::contains("INFRAPLATE_API_KEY"));
}

#[test]
fn unreachable_api_exits_five() {
    let ws = Workspace::new();
    ws.write("templates/main.tf", "# {{name}}\n");
    // Port 9 (discard) on localhost is closed on test machines.
    ws.infraplate()
        .args(["generate", "blueprint", "shop", "-t", "templates"])
        .args(["--api-url", "http://127.0.0.1:9/api/v1", "--api-key", "k", "--timeout", "2"])
        .assert()
        .code(5);
    assert!(!ws.path("output").exists());
}

#[test]
fn bad_api_url_is_a_configuration_error() {
    let ws = Workspace::new();
    ws.infraplate()
        .args(["list-variables", "blueprint", "shop"])
        .args(["--api-url", "localhost:8082", "--api-key", "k"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("http://"));
}

#[test]
fn malformed_variables_file_exits_four() {
    let ws = Workspace::new();
    ws.write("templates/main.tf", "# {{name}}\n");
    ws.write("vars.json", "{\"region\": ");
    ws.generate("shop")
        .args(["--vars", "vars.json"])
        .assert()
        .code(4);
    assert!(!ws.path("out").exists());
}

#[test]
fn unknown_subcommand_exits_two() {
    let ws = Workspace::new();
    ws.infraplate().arg("explode").assert().code(2);
}

#[test]
fn unknown_config_key_exits_four() {
    let ws = Workspace::new();
    ws.infraplate()
        .args(["config", "get", "nope.nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn missing_explicit_config_file_exits_four() {
    let ws = Workspace::new();
    ws.infraplate()
        .args(["-c", "absent.toml", "config", "list"])
        .assert()
        .code(4);
}

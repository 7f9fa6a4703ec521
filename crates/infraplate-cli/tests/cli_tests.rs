//! Black-box tests for the `infraplate` binary, rendering from snapshot
//! payloads so no API is needed.

mod common;

use common::{Workspace, files_under};
use predicates::prelude::*;

// ============================================================================
// generate
// ============================================================================

#[test]
fn generate_mirrors_the_template_tree() {
    let ws = Workspace::new();
    ws.write(
        "templates/main.tf",
        "provider \"aws\" {\n  region = \"{{region}}\"\n}\n{{#each resources}}\n# {{name}} ({{type}})\n{{/each}}",
    );
    ws.write(
        "templates/k8s/deploy.yaml",
        "{{#each resources}}---\nname: {{name}}\nreplicas: {{configuration.replicas|default:\"1\"}}\n{{/each}}",
    );

    ws.generate("shop")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 file(s) written"))
        .stdout(predicate::str::contains("terraform -chdir=out init"))
        .stdout(predicate::str::contains("kubectl apply --dry-run=client"));

    assert_eq!(files_under(&ws.path("out")), ["k8s/deploy.yaml", "main.tf"]);
    assert_eq!(
        ws.read("out/k8s/deploy.yaml"),
        "---\nname: web\nreplicas: 2\n---\nname: db\nreplicas: 1\n"
    );
    assert!(ws.read("out/main.tf").contains("region = \"eu-west-1\""));
}

#[test]
fn unknown_blueprint_exits_three_and_creates_nothing() {
    let ws = Workspace::new();
    ws.write("templates/main.tf", "# {{name}}\n");

    ws.generate("nope")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("blueprint 'nope' not found"));

    assert!(!ws.path("out").exists());
}

#[test]
fn second_run_is_byte_identical() {
    let ws = Workspace::new();
    ws.write("templates/app.json", "{\"name\": \"{{name}}\", \"resources\": {{resources}}}\n");

    ws.generate("shop").assert().success();
    let first = ws.read("out/app.json");
    ws.generate("shop").assert().success();
    assert_eq!(ws.read("out/app.json"), first);
}

#[test]
fn missing_variable_warns_by_default_and_fails_when_strict() {
    let ws = Workspace::new();
    ws.write("templates/main.tf", "name = \"{{nmae}}\"\n");

    ws.generate("shop")
        .assert()
        .success()
        .stdout(predicate::str::contains("variable 'nmae' is not defined"));
    assert_eq!(ws.read("out/main.tf"), "name = \"\"\n");

    ws.generate_with("shop", "templates", "strict-out")
        .arg("--strict")
        .assert()
        .code(6)
        .stdout(predicate::str::contains("did you mean: name"))
        .stderr(predicate::str::contains("1 of 1 file(s) failed"));
    assert!(!ws.path("strict-out/main.tf").exists());
}

#[test]
fn invalid_yaml_fails_only_that_file() {
    let ws = Workspace::new();
    ws.write("templates/good.yaml", "image: \"{{resources[0].configuration.image}}\"\n");
    ws.write("templates/bad.yaml", "image: {{resources[0].configuration.image}}: x\n");

    ws.generate("shop")
        .assert()
        .code(6)
        .stdout(predicate::str::contains("bad.yaml: rendered output is not valid yaml"));

    assert_eq!(files_under(&ws.path("out")), ["good.yaml"]);
}

#[test]
fn atomic_run_writes_nothing_on_error() {
    let ws = Workspace::new();
    ws.write("templates/good.yaml", "name: {{name}}\n");
    ws.write("templates/bad.yaml", "{{#if name}}unclosed\n");

    ws.generate("shop")
        .arg("--atomic")
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Atomic run blocked"));

    assert!(!ws.path("out/good.yaml").exists());
}

#[test]
fn dry_run_writes_nothing() {
    let ws = Workspace::new();
    ws.write("templates/main.tf", "# {{name}}\n");

    ws.generate("shop")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(!ws.path("out").exists());
}

#[test]
fn custom_variables_override_with_warning() {
    let ws = Workspace::new();
    ws.write("templates/main.tf", "region = \"{{region}}\"\n");
    ws.write("staging.yaml", "region: us-east-2\n");

    ws.generate("shop")
        .args(["--vars", "staging.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom variable overrides 'region'"));

    assert_eq!(ws.read("out/main.tf"), "region = \"us-east-2\"\n");
}

#[test]
fn skip_policy_keeps_existing_files() {
    let ws = Workspace::new();
    ws.write("templates/main.tf", "# {{name}}\n");
    ws.write("out/main.tf", "# hand edited\n");

    ws.generate("shop")
        .args(["--overwrite", "skip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 existing file(s) kept"));

    assert_eq!(ws.read("out/main.tf"), "# hand edited\n");
}

#[test]
fn json_output_is_the_run_report() {
    let ws = Workspace::new();
    ws.write("templates/main.tf", "# {{name}}\n");

    let assert = ws
        .generate("shop")
        .args(["--output-format", "json"])
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["kind"], "blueprint");
    assert_eq!(report["files"][0]["relative_path"], "main.tf");
    assert_eq!(report["files"][0]["status"], "written");
}

#[test]
fn stack_snapshots_can_be_yaml() {
    let ws = Workspace::new();
    ws.write("templates/env.json", "{\"env\": \"{{stack.environment}}\"}\n");

    ws.infraplate()
        .args(["generate", "stack", "shop-prod", "-t", "templates", "-o", "out"])
        .args(["--from-dir", "snapshots"])
        .assert()
        .success();

    assert_eq!(ws.read("out/env.json"), "{\"env\": \"production\"}\n");
}

// ============================================================================
// list-variables
// ============================================================================

#[test]
fn list_variables_plain() {
    let ws = Workspace::new();
    ws.infraplate()
        .args(["list-variables", "blueprint", "shop", "--from-dir", "snapshots"])
        .args(["--format", "plain", "--filter", "resources[0]"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resources[0].name\tstring\t\"web\""))
        .stdout(predicate::str::contains("resources[0].configuration\tobject\t{ 2 properties }"))
        .stdout(predicate::str::contains("resources[1]").not());
}

#[test]
fn list_variables_table_groups_by_root() {
    let ws = Workspace::new();
    ws.infraplate()
        .args(["list-variables", "blueprint", "shop", "--from-dir", "snapshots"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[resources]"))
        .stdout(predicate::str::contains("[region]"))
        .stdout(predicate::str::contains("blueprint.name").not());
}

#[test]
fn list_variables_json() {
    let ws = Workspace::new();
    let assert = ws
        .infraplate()
        .args(["list-variables", "blueprint", "shop", "--from-dir", "snapshots"])
        .args(["--format", "json", "--filter", "name"])
        .assert()
        .success();

    let listing: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(listing["entries"][0]["path"], "name");
    assert_eq!(listing["entries"][0]["type"], "string");
}

// ============================================================================
// init / config / completions / help
// ============================================================================

#[test]
fn init_then_config_get() {
    let ws = Workspace::new();
    ws.infraplate()
        .args(["-c", "infraplate.toml", "init"])
        .assert()
        .success();
    assert!(ws.read("infraplate.toml").contains("[render]"));

    ws.infraplate()
        .args(["-c", "infraplate.toml", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));

    ws.infraplate()
        .args(["-c", "infraplate.toml", "config", "get", "api.timeout_secs"])
        .assert()
        .success()
        .stdout("30\n");
}

#[test]
fn environment_overrides_config() {
    let ws = Workspace::new();
    ws.infraplate()
        .env("INFRAPLATE_RENDER__OVERWRITE", "skip")
        .args(["config", "get", "render.overwrite"])
        .assert()
        .success()
        .stdout("skip\n");
}

#[test]
fn completions_for_bash() {
    let ws = Workspace::new();
    ws.infraplate()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("infraplate"));
}

#[test]
fn help_and_version() {
    let ws = Workspace::new();
    ws.infraplate()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("list-variables"));
    ws.infraplate()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

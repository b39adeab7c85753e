//! The `analytics-snippet` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SETTINGS: &str = r#"
js_file_location = "http://x/js"
version = "H.20"
codesnippet = 'foo="bar";'
role_tracking_type = "exclusive"
track_roles = ["administrator", "0"]

[[extra_variables]]
name = "s.pageName"
value = "[node:title]"
"#;

const FIXTURE: &str = r#"{
    "entities": [
        {"entity_type": "node", "id": "1", "fields": {"title": "Hello <World>"}},
        {"entity_type": "node", "id": "2", "fields": {
            "title": "Quiet page",
            "field_analytics": [{"include_main_codesnippet": 0, "include_custom_variables": 0, "codesnippet": "custom();"}]
        }}
    ],
    "field_map": [{"entity_type": "node", "fields": ["field_analytics"]}],
    "token_context": {}
}"#;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new(settings: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("analytics.toml"), settings).unwrap();
        fs::write(dir.path().join("site.json"), FIXTURE).unwrap();
        Self {
            dir,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("analytics-snippet").unwrap();
        cmd.env_remove("RUST_LOG")
            .arg("--settings")
            .arg(self.path("analytics.toml"))
            .arg("--fixture")
            .arg(self.path("site.json"));
        cmd
    }
}

#[test]
fn test_renders_text_for_node_page() {
    let project = Project::new(SETTINGS);
    project
        .command()
        .args(["--path", "/node/1"])
        .assert()
        .success()
        .stdout("foo=\"bar\";\ns.pageName=\"Hello &lt;World&gt;\";\n");
}

#[test]
fn test_entity_override_from_fixture() {
    let project = Project::new(SETTINGS);
    project.command().args(["--path", "/node/2"]).assert().success().stdout("custom();\n");
}

#[test]
fn test_json_payload() {
    let project = Project::new(SETTINGS);
    let output = project.command().args(["--path", "/node/1", "--format", "json"]).assert().success().get_output().stdout.clone();

    let payload: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(payload["theme"], "analytics_code");
    assert_eq!(payload["js_file_location"], "http://x/js");
    assert_eq!(payload["version"], "H.20");
    assert_eq!(payload["image_location"], "");
}

#[test]
fn test_forbidden_role_prints_nothing() {
    let project = Project::new(SETTINGS);
    project
        .command()
        .args(["--path", "/node/1", "--role", "authenticated", "--role", "administrator"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_admin_path_prints_nothing() {
    let project = Project::new(SETTINGS);
    project.command().args(["--path", "/admin/content"]).assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn test_unconfigured_warns_and_prints_nothing() {
    let project = Project::new("codesnippet = 'foo();'\n");
    project
        .command()
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("missing required configuration settings"));
}

#[test]
fn test_quiet_suppresses_warning() {
    let project = Project::new("codesnippet = 'foo();'\n");
    project.command().arg("--quiet").assert().success().stderr(predicate::str::is_empty());
}

#[test]
fn test_missing_settings_file_fails() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("analytics-snippet")
        .unwrap()
        .arg("--settings")
        .arg(dir.path().join("missing.toml"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_unknown_role_tracking_type_is_exclusive() {
    let project = Project::new(
        "js_file_location = \"http://x/js\"\nversion = \"H.20\"\ncodesnippet = 's.t();'\nrole_tracking_type = \"Inclusive\"\ntrack_roles = [\"editor\"]\n",
    );
    project
        .command()
        .args(["--path", "/node/1", "--role", "editor"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Unrecognised role_tracking_type"));
    project.command().args(["--path", "/node/1", "--role", "visitor"]).assert().success().stdout("s.t();\n");
}

#[test]
fn test_unknown_role_tracking_type_on_unconfigured_site() {
    let project = Project::new("role_tracking_type = \"sometimes\"\n");
    project
        .command()
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("missing required configuration settings"));
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SOURCE_YAML: &str = r#"version: 2
sources:
  - name: raw
    tables:
      - name: customers
        description: Hand written
        columns:
          - name: id
            description: Customer key
          - name: fax_number
          - name: email
"#;

const CUSTOMERS_TABLE: &str = r#"{
  "tableReference": { "projectId": "acme", "datasetId": "raw", "tableId": "customers" },
  "labels": { "domain": "crm" },
  "schema": {
    "fields": [
      { "name": "id", "type": "INTEGER" },
      { "name": "email", "type": "STRING", "description": "Primary email" },
      { "name": "signup_at", "type": "TIMESTAMP" }
    ]
  }
}"#;

fn dbtsync_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dbtsync"))
}

fn run_cli(home: &Path, args: &[&str]) -> Output {
    Command::new(dbtsync_bin())
        .args(args)
        .env("DBTSYNC_HOME", home)
        .env_remove("RUST_LOG")
        .env_remove("DBTSYNC_CONFIG")
        .env_remove("DBTSYNC_TABLE_JSON")
        .output()
        .expect("failed to execute dbtsync CLI")
}

fn parse_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|err| {
        panic!(
            "failed to parse JSON output: {}\nstdout:\n{}\nstderr:\n{}",
            err,
            stdout,
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

struct Fixture {
    home: TempDir,
    data: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Self {
            home: TempDir::new().expect("create temp home"),
            data: TempDir::new().expect("create data dir"),
        };
        fs::write(fixture.source(), SOURCE_YAML).expect("write source");
        fs::write(fixture.table(), CUSTOMERS_TABLE).expect("write table");
        fixture
    }

    fn source(&self) -> PathBuf {
        self.data.path().join("src_customers.yml")
    }

    fn table(&self) -> PathBuf {
        self.data.path().join("customers.json")
    }

    fn run(&self, args: &[&str]) -> Output {
        run_cli(self.home.path(), args)
    }
}

#[test]
fn test_update_json_in_place() {
    let fx = Fixture::new();
    let source = fx.source().to_string_lossy().to_string();
    let table = fx.table().to_string_lossy().to_string();

    let output = fx.run(&["update", &source, "--table", &table, "--json"]);
    assert!(
        output.status.success(),
        "update failed\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = parse_json(&output);
    assert_eq!(json["table"], "customers");
    assert_eq!(json["warehouse_table"], "acme.raw.customers");
    assert_eq!(json["dry_run"], false);
    assert_eq!(json["columns"], serde_json::json!(["id", "email", "signup_at"]));
    assert_eq!(json["changes"]["added"], serde_json::json!(["signup_at"]));
    assert_eq!(json["changes"]["removed"], serde_json::json!(["fax_number"]));
    assert_eq!(json["changes"]["redescribed"], serde_json::json!(["email"]));
    // The live table has no description; the documented one stays.
    assert_eq!(json["description"], "Hand written");
    assert!(json["yaml"].is_null());

    let written = fs::read_to_string(fx.source()).expect("read source");
    assert!(written.contains("Customer key"));
    assert!(written.contains("domain: crm"));
    assert!(!written.contains("fax_number"));
}

#[test]
fn test_update_dry_run_leaves_file_alone() {
    let fx = Fixture::new();
    let source = fx.source().to_string_lossy().to_string();
    let table = fx.table().to_string_lossy().to_string();

    let output = fx.run(&["update", &source, "-t", &table, "--dry-run"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("signup_at"));
    assert_eq!(fs::read_to_string(fx.source()).expect("read source"), SOURCE_YAML);
}

#[test]
fn test_update_to_output_path() {
    let fx = Fixture::new();
    let source = fx.source().to_string_lossy().to_string();
    let table = fx.table().to_string_lossy().to_string();
    let out = fx.data.path().join("out.yml");
    let out_str = out.to_string_lossy().to_string();

    let output = fx.run(&["update", &source, "--table", &table, "--output", &out_str]);
    assert!(output.status.success());

    assert_eq!(fs::read_to_string(fx.source()).expect("read source"), SOURCE_YAML);
    let written = fs::read_to_string(&out).expect("read output");
    assert!(written.contains("signup_at"));
}

#[test]
fn test_update_rejects_multi_table_source() {
    let fx = Fixture::new();
    fs::write(
        fx.source(),
        "sources:\n  - name: raw\n    tables:\n      - name: a\n      - name: b\n",
    )
    .expect("write source");
    let source = fx.source().to_string_lossy().to_string();
    let table = fx.table().to_string_lossy().to_string();

    let output = fx.run(&["update", &source, "--table", &table, "--json"]);
    assert!(!output.status.success());

    let json = parse_json(&output);
    assert!(json["error"].as_str().unwrap().contains("contains multiple tables"));
    assert!(!json["suggestions"].as_array().unwrap().is_empty());
}

#[test]
fn test_update_missing_table_json() {
    let fx = Fixture::new();
    let source = fx.source().to_string_lossy().to_string();
    let missing = fx.data.path().join("nope.json").to_string_lossy().to_string();

    let output = fx.run(&["update", &source, "--table", &missing, "--json"]);
    assert!(!output.status.success());

    let json = parse_json(&output);
    assert!(json["error"].as_str().unwrap().starts_with("File not found"));
}

#[test]
fn test_check_json() {
    let fx = Fixture::new();
    let source = fx.source().to_string_lossy().to_string();

    let output = fx.run(&["check", &source, "--json"]);
    assert!(output.status.success());

    let json = parse_json(&output);
    assert_eq!(json["valid"], true);
    assert_eq!(json["table"], "customers");
    assert_eq!(json["columns"], serde_json::json!(["id", "fax_number", "email"]));
}

#[test]
fn test_config_json_uses_home() {
    let fx = Fixture::new();
    fs::write(fx.home.path().join("config.toml"), "log_filter = \"dbtsync=debug\"\n")
        .expect("write config");

    let output = fx.run(&["config", "--json"]);
    assert!(output.status.success());

    let json = parse_json(&output);
    let home = fx.home.path().to_string_lossy().to_string();
    assert_eq!(json["home"], home);
    assert_eq!(json["config"]["exists"], true);
    assert_eq!(json["log_filter"], "dbtsync=debug");
    assert!(fx.home.path().join("logs").join("dbtsync.log").exists());
}

use clap::Parser;
use docket_cli::{Cli, Command};
use docket_db::DbConfig;
use docket_types::ejson::{self, StringifyOptions};
use docket_types::Value;
use pretty_assertions::assert_eq;

const SPEC: &str = r#"{
    "fields": {
        "text": { "type": "text", "safe": true, "transform": ["toLowerCase"] },
        "list": { "type": "list" },
        "user": { "type": "text", "safe": true, "synonyms": ["username"] },
        "created": { "type": "date", "safe": true }
    }
}"#;

// ── describe ─────────────────────────────────────────────────────

#[test]
fn describe_lists_derived_artifacts() {
    let out = docket_cli::describe(SPEC).unwrap();
    assert_eq!(
        out,
        "fields: 4 (db: default)\n\
         synonyms:\n  user <- username\n\
         safe: text, user, created\n\
         transforms:\n  text -> toLowerCase\n"
    );
}

#[test]
fn describe_rejects_malformed_spec() {
    assert!(docket_cli::describe(r#"{"db":"x"}"#).is_err());
}

// ── normalize ────────────────────────────────────────────────────

#[test]
fn normalize_prints_safe_fields_with_id() {
    let out = docket_cli::normalize(
        SPEC,
        r#"{"_id":"r1","text":"Hello","list":["a"],"username":"bob","junk":1}"#,
        "records",
        &StringifyOptions::default(),
        DbConfig::default(),
    )
    .unwrap();

    assert_eq!(out, r#"{"_id":"r1","text":"hello","user":"bob"}"#);
}

#[test]
fn normalize_preserves_dates() {
    let out = docket_cli::normalize(
        SPEC,
        r#"{"_id":"r1","created":{"$date":86400000}}"#,
        "records",
        &StringifyOptions::canonical(),
        DbConfig::default(),
    )
    .unwrap();

    let parsed = ejson::parse(&out).unwrap();
    assert_eq!(parsed["created"].as_date().unwrap().timestamp_millis(), 86_400_000);
}

#[test]
fn normalize_generates_id_of_configured_length() {
    let config = DbConfig {
        id_digits: 10,
        ..DbConfig::default()
    };
    let out = docket_cli::normalize(SPEC, "{}", "records", &StringifyOptions::default(), config)
        .unwrap();
    let parsed = ejson::parse(&out).unwrap();
    assert_eq!(parsed["_id"].as_str().unwrap().len(), 10);
}

// ── save ─────────────────────────────────────────────────────────

#[tokio::test]
async fn save_with_backend_ids_reports_created_id() {
    let out = docket_cli::save(
        SPEC,
        r#"{"text":"X"}"#,
        "records",
        &StringifyOptions::default(),
        DbConfig::default(),
        true,
    )
    .await
    .unwrap();

    let (status, body) = out.split_once('\n').unwrap();
    let id = status.strip_prefix("created ").unwrap();
    let parsed = ejson::parse(body).unwrap();
    assert_eq!(parsed["_id"], Value::from(id));
    assert_eq!(parsed["text"], Value::from("x"));
}

#[tokio::test]
async fn save_existing_record_reports_update() {
    let out = docket_cli::save(
        SPEC,
        r#"{"_id":"known","text":"Y"}"#,
        "records",
        &StringifyOptions::default(),
        DbConfig::default(),
        false,
    )
    .await
    .unwrap();

    assert_eq!(out, "updated\n{\"_id\":\"known\",\"text\":\"y\"}");
}

#[tokio::test]
async fn save_with_local_id_reports_update() {
    let out = docket_cli::save(
        SPEC,
        r#"{"text":"Z"}"#,
        "records",
        &StringifyOptions::default(),
        DbConfig::default(),
        false,
    )
    .await
    .unwrap();

    let (status, body) = out.split_once('\n').unwrap();
    assert_eq!(status, "updated");
    let parsed = ejson::parse(body).unwrap();
    assert_eq!(parsed["_id"].as_str().unwrap().len(), 24);
    assert_eq!(parsed["text"], Value::from("z"));
}

// ── Argument parsing ─────────────────────────────────────────────

#[test]
fn parses_save_arguments() {
    let cli = Cli::try_parse_from([
        "docket", "-v", "save", "--schema", "s.json", "--assign-ids", "--pretty",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Command::Save { record, assign_ids } => {
            assert!(assign_ids);
            assert_eq!(record.name, "records");
            assert!(record.stringify_options().indent);
            assert!(record.input.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

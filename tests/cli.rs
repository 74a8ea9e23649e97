use assert_cmd::prelude::*;
use mockito::Matcher;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("config.yaml");
    let contents = format!(
        "store_path: {}\ntoken: test-token\n{}",
        dir.join("store.db").display(),
        extra
    );
    fs::write(&path, contents).expect("failed to write config");
    path
}

fn dripfy() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dripfy"));
    for var in [
        "DRIPFY_CONFIG",
        "DRIPFY_API_BASE",
        "DRIPFY_TOKEN",
        "DRIPFY_ROLE",
        "DRIPFY_LANG",
        "DRIPFY_FORMAT",
        "DRIPFY_DEBUG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1").env("CLICOLOR", "0");
    cmd
}

fn flow_body(step_status: &str) -> String {
    format!(
        r#"{{
            "id": "task:T-1",
            "type": "task",
            "entityId": "T-1",
            "reference": "T-1",
            "title": "Restock warehouse",
            "status": "pending",
            "submittedAt": "2024-03-01T09:00:00.000Z",
            "steps": [{{
                "id": "manager",
                "label": "Manager approval",
                "requiredRole": "manager",
                "status": "{}",
                "slaSecondsRemaining": 3600
            }}]
        }}"#,
        step_status
    )
}

const AUDIT_PAGE: &str = r#"{
    "ok": true,
    "results": [
        {
            "id": "log-1",
            "timestamp": "2024-03-01T10:00:00.000Z",
            "user": "ayse",
            "action": "Approved",
            "targetType": "invoice",
            "targetId": "INV-42",
            "label": "Finance",
            "sourceModule": "finance",
            "criticality": "high",
            "details": "Paid \"in full\"\nvia transfer"
        },
        {
            "id": "log-2",
            "timestamp": "2024-03-01T11:00:00.000Z",
            "user": "jonas",
            "action": "Deleted",
            "targetType": "task",
            "targetId": "T-9",
            "criticality": "low"
        }
    ],
    "nextCursor": null,
    "hasMore": false,
    "total": 2
}"#;

// ============================================================================
// Local commands
// ============================================================================

#[test]
fn status_uses_custom_config_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "role: approver\nlanguage: de\n");

    let assert = dripfy()
        .arg("status")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("Role: approver"));
    assert!(stdout.contains("Language: de"));
    assert!(stdout.contains(&config_path.to_string_lossy().to_string()));
    assert!(!stdout.contains("test-token"));

    Ok(())
}

#[test]
fn status_without_config_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let missing = temp.path().join("absent.yaml");

    let assert = dripfy()
        .arg("status")
        .arg("--config")
        .arg(&missing)
        .arg("--format")
        .arg("json")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("not found, using defaults"));
    assert!(stdout.contains("http://localhost:3000"));

    Ok(())
}

#[test]
fn role_env_overrides_config() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "role: user\n");

    let assert = dripfy()
        .arg("status")
        .arg("--config")
        .arg(&config_path)
        .env("DRIPFY_ROLE", "admin")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("Role: admin"));

    Ok(())
}

#[test]
fn audit_link_merges_flags_into_dashboard_url() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "");

    let assert = dripfy()
        .args(["audit", "link", "--link"])
        .arg("https://ops.example/dashboard?tab=audit&user=ayse")
        .args(["--label", "Finance", "--criticality", "high"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert_eq!(
        stdout.trim(),
        "https://ops.example/dashboard?tab=audit&user=ayse&label=Finance&criticality=high"
    );

    Ok(())
}

#[test]
fn audit_link_without_dashboard_url_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "");

    let assert = dripfy()
        .args(["audit", "link", "--user", "ayse"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("No dashboard URL"));

    Ok(())
}

#[test]
fn saved_filters_persist_between_runs() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "");

    dripfy()
        .args(["audit", "filters", "save", "Finance highs", "--label", "Finance"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let assert = dripfy()
        .args(["audit", "filters", "list", "--format", "json"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout)?;
    let sets = value["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0]["name"], "Finance highs");
    assert_eq!(sets[0]["filters"], "label=Finance");

    let id = sets[0]["id"].as_str().unwrap_or_default().to_string();
    assert!(id.starts_with("filter-"));

    dripfy()
        .args(["audit", "filters", "delete", &id])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let assert = dripfy()
        .args(["audit", "filters", "list"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("No results found."));

    Ok(())
}

#[test]
fn blank_filter_name_saves_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "");

    let assert = dripfy()
        .args(["audit", "filters", "save", "   ", "--user", "ayse"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("Nothing saved"));

    Ok(())
}

#[test]
fn deleting_unknown_filter_set_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "");

    let assert = dripfy()
        .args(["audit", "filters", "delete", "filter-1"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("No saved filter set with id filter-1"));

    Ok(())
}

#[test]
fn invalid_date_is_rejected_by_parser() {
    dripfy()
        .args(["audit", "list", "--from", "01.03.2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--from"));
}

#[test]
fn version_prints_package_version() {
    dripfy()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn completion_generates_script() {
    dripfy()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dripfy"));
}

#[test]
fn connection_error_shows_network_message() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "api_base: http://127.0.0.1:9\n");

    let assert = dripfy()
        .args(["approvals", "list"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("Network error"));

    Ok(())
}

// ============================================================================
// HTTP-backed commands
// ============================================================================

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn audit_list_json_includes_total_and_link() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _logs = server
        .mock("GET", "/api/audit/logs")
        .match_header("authorization", "Bearer test-token")
        .match_query(Matcher::UrlEncoded("user".into(), "ayse".into()))
        .with_status(200)
        .with_body(AUDIT_PAGE)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(
        temp.path(),
        &format!(
            "api_base: {}\ndashboard_url: https://ops.example/dashboard?tab=audit\n",
            server.url()
        ),
    );

    let assert = dripfy()
        .args(["audit", "list", "--user", "ayse", "--format", "json"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout)?;
    assert_eq!(value["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["meta"]["total"], 2);
    assert_eq!(
        value["meta"]["link"],
        "https://ops.example/dashboard?tab=audit&user=ayse"
    );

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn audit_export_writes_csv() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _logs = server
        .mock("GET", "/api/audit/logs")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(AUDIT_PAGE)
        .create();

    let temp = tempdir()?;
    let out_dir = temp.path().join("reports");
    let config_path = write_config(temp.path(), &format!("api_base: {}\n", server.url()));

    dripfy()
        .args(["audit", "export", "--dir"])
        .arg(&out_dir)
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let files: Vec<_> = fs::read_dir(&out_dir)?.collect::<std::result::Result<_, _>>()?;
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().to_string_lossy().to_string();
    assert!(name.starts_with("audit-log-") && name.ends_with(".csv"));

    let csv = fs::read_to_string(files[0].path())?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("\"Timestamp\",\"User\""));
    assert!(lines[1].contains("\"Paid \"\"in full\"\" via transfer\""));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn audit_list_shows_server_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _logs = server
        .mock("GET", "/api/audit/logs")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"ok": false, "error": "Audit store offline"}"#)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &format!("api_base: {}\n", server.url()));

    let assert = dripfy()
        .args(["audit", "list"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("Audit store offline"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn unauthorized_error_suggests_init() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _flows = server
        .mock("GET", "/api/approvals/flows")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"ok": false, "error": "Unauthorized"}"#)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &format!("api_base: {}\n", server.url()));

    let assert = dripfy()
        .args(["approvals", "list"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("dripfy init"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn approvals_list_pending_table() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _flows = server
        .mock("GET", "/api/approvals/flows")
        .match_query(Matcher::UrlEncoded("type".into(), "task".into()))
        .with_status(200)
        .with_body(format!(r#"{{"ok": true, "flows": [{}]}}"#, flow_body("pending")))
        .create();

    let temp = tempdir()?;
    let config_path = write_config(
        temp.path(),
        &format!("api_base: {}\nrole: manager\n", server.url()),
    );

    let assert = dripfy()
        .args(["approvals", "list", "--type", "task", "--pending", "--format", "table"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("task:T-1"));
    assert!(stdout.contains("Manager approval"));
    assert!(stdout.contains("Due in 1 hour"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn approvals_decide_posts_decision() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _flows = server
        .mock("GET", "/api/approvals/flows")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(format!(r#"{{"ok": true, "flows": [{}]}}"#, flow_body("pending")))
        .create();
    let decision = server
        .mock("POST", "/api/approvals/flows/task/T-1/steps/manager/decision")
        .match_body(Matcher::Json(serde_json::json!({
            "decision": "approved",
            "comment": "Budget confirmed"
        })))
        .with_status(200)
        .with_body(format!(r#"{{"ok": true, "flow": {}}}"#, flow_body("approved")))
        .expect(1)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(
        temp.path(),
        &format!("api_base: {}\nrole: manager\n", server.url()),
    );

    let assert = dripfy()
        .args(["approvals", "decide", "task:T-1", "manager", "approve"])
        .args(["--comment", "  Budget confirmed  "])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    decision.assert();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("task:T-1 / manager"));
    assert!(stdout.contains("Approved"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn approvals_decide_refuses_insufficient_role() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _flows = server
        .mock("GET", "/api/approvals/flows")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(format!(r#"{{"ok": true, "flows": [{}]}}"#, flow_body("pending")))
        .create();
    let decision = server
        .mock("POST", "/api/approvals/flows/task/T-1/steps/manager/decision")
        .expect(0)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &format!("api_base: {}\nrole: user\n", server.url()));

    let assert = dripfy()
        .args(["approvals", "decide", "task:T-1", "manager", "reject"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure();

    decision.assert();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("You do not have permission to act on this step."));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn approvals_watch_exits_when_nothing_pending() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _flows = server
        .mock("GET", "/api/approvals/flows")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(format!(r#"{{"ok": true, "flows": [{}]}}"#, flow_body("approved")))
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &format!("api_base: {}\n", server.url()));

    let assert = dripfy()
        .args(["approvals", "watch"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("No approval steps are pending."));

    Ok(())
}

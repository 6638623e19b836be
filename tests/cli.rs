use assert_cmd::Command;
use browser_relay::cli::record_style_for;
use browser_relay::report::RecordStyle;
use serde_json::Value;

fn relay() -> Command {
    let mut cmd = Command::cargo_bin("browser-relay").unwrap();
    cmd.env("RUST_LOG", "error");
    cmd
}

/// The record is the last line; logs may precede it on stderr.
fn last_json_line(bytes: &[u8]) -> Value {
    let text = String::from_utf8_lossy(bytes);
    let line = text
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_else(|| panic!("no output in {text:?}"));
    serde_json::from_str(line).unwrap_or_else(|e| panic!("not JSON ({e}): {line}"))
}

fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn test_run_task_success_on_stdout() {
    let assert = relay()
        .args(["run-task", "--task", r#"{"id":"t1","name":"demo","steps":[]}"#])
        .assert()
        .success();

    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "stdout: {stdout}");

    let record = last_json_line(&output.stdout);
    assert_eq!(record["status"], "success");
    assert_eq!(record["task_id"], "t1");
}

#[test]
fn test_run_task_without_task_fails_on_stderr() {
    let assert = relay().arg("run-task").assert().code(1);

    let output = assert.get_output();
    assert!(output.stdout.is_empty());

    let record = last_json_line(&output.stderr);
    assert_eq!(record["status"], "error");
    assert!(record["error"]
        .as_str()
        .unwrap()
        .contains("No task data provided"));
    assert!(record["timestamp"].is_string());
}

#[test]
fn test_get_tables_unreachable_reports_error_record() {
    let port = closed_port();
    let assert = relay()
        .args([
            "get-tables",
            "--url",
            &format!("http://127.0.0.1:{port}"),
            "--key",
            "anon-key",
        ])
        .assert()
        .code(1);

    let record = last_json_line(&assert.get_output().stdout);
    assert_eq!(record["status"], "error");
    assert!(record.get("tables").is_none());
}

#[test]
fn test_voyager_without_chrome_fails_with_success_false() {
    let port = closed_port();
    let assert = relay()
        .args(["voyager", "--task", "Create an Outlook account", "--port", &port.to_string()])
        .assert()
        .code(1);

    let output = assert.get_output();
    assert!(output.stdout.is_empty());
    let record = last_json_line(&output.stderr);
    assert_eq!(record["success"], false);
    assert!(record["error"].is_string());
}

#[test]
fn test_table_with_invalid_data_fails_before_connecting() {
    let assert = relay()
        .args([
            "table",
            "--url",
            "about:blank",
            "--table-id",
            "1",
            "--table-action",
            "write",
            "--data",
            "{oops",
        ])
        .assert()
        .code(1);

    let record = last_json_line(&assert.get_output().stderr);
    assert_eq!(record["success"], false);
    assert!(record["error"]
        .as_str()
        .unwrap()
        .starts_with("--data is not valid JSON"));
}

#[test]
fn test_missing_required_flag_reports_json_record() {
    let assert = relay()
        .args(["voyager", "--port", "1"])
        .assert()
        .code(1);

    let output = assert.get_output();
    assert!(output.stdout.is_empty());
    let record = last_json_line(&output.stderr);
    assert_eq!(record["success"], false);
    assert!(record["error"].as_str().unwrap().contains("--task"));
}

#[test]
fn test_bad_flag_value_reports_status_record() {
    let assert = relay()
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY")
        .args(["get-tables", "--limit", "many"])
        .assert()
        .code(1);

    let record = last_json_line(&assert.get_output().stderr);
    assert_eq!(record["status"], "error");
    assert!(record["timestamp"].is_string());
}

#[test]
fn test_help_still_prints_usage() {
    let assert = relay().arg("--help").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("Usage"));
}

#[test]
fn test_record_style_follows_subcommand() {
    let args = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    assert_eq!(
        record_style_for(&args(&["browser-relay", "-d", "table", "--url", "x"])),
        RecordStyle::Success
    );
    assert_eq!(
        record_style_for(&args(&["browser-relay", "voyager"])),
        RecordStyle::Success
    );
    assert_eq!(
        record_style_for(&args(&["browser-relay", "get-tables"])),
        RecordStyle::Status
    );
    assert_eq!(record_style_for(&args(&["browser-relay"])), RecordStyle::Status);
}

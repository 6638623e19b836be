mod support;

use std::time::Duration;

use browser_relay::table::{table_selector, TableAction, TableOps, TableOutcome};
use serde_json::json;
use support::FakePage;

const WAIT: Duration = Duration::from_millis(10);

#[tokio::test]
async fn test_read_missing_table() {
    let page = FakePage::new();
    let outcome = TableOps::new(&page)
        .run("42", TableAction::Read, None, WAIT)
        .await;

    assert!(!outcome.succeeded());
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Table with ID 42 not found");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_read_returns_rows() {
    let page = FakePage::new()
        .with("#table-users")
        .evaluating_to(json!([["Name", "Age"], ["Ann", "30"]]));

    let outcome = TableOps::new(&page)
        .run("users", TableAction::Read, None, WAIT)
        .await;

    assert_eq!(
        outcome,
        TableOutcome::Data {
            success: true,
            data: vec![
                vec!["Name".to_string(), "Age".to_string()],
                vec!["Ann".to_string(), "30".to_string()],
            ],
        }
    );
    let script = page.calls().into_iter().find(|c| c.starts_with("eval")).unwrap();
    assert!(script.contains("\"#table-users\""));
}

#[tokio::test]
async fn test_write_requires_data() {
    let page = FakePage::new().with("#table-7");

    let outcome = TableOps::new(&page)
        .run("7", TableAction::Write, None, WAIT)
        .await;

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Data required for write/update operations");
}

#[tokio::test]
async fn test_write_rejects_empty_payloads() {
    let page = FakePage::new()
        .with("#table-7")
        .with(".table-update-success");

    for data in [json!({}), json!([]), json!(""), json!(null)] {
        let outcome = TableOps::new(&page)
            .run("7", TableAction::Write, Some(&data), WAIT)
            .await;

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false, "payload: {data}");
        assert_eq!(json["error"], "Data required for write/update operations");
    }
    assert!(page.calls().iter().all(|c| !c.starts_with("eval")));
}

#[tokio::test]
async fn test_write_dispatches_event_and_waits_for_confirmation() {
    let page = FakePage::new()
        .with("#table-7")
        .with(".table-update-success");
    let data = json!({"row": 1, "values": ["a", "b"]});

    let outcome = TableOps::new(&page)
        .run("7", TableAction::Update, Some(&data), WAIT)
        .await;

    assert_eq!(
        outcome,
        TableOutcome::Message {
            success: true,
            message: "Table update completed".to_string(),
        }
    );

    let calls = page.calls();
    let script = calls.iter().find(|c| c.starts_with("eval")).unwrap();
    assert!(script.contains("'table-operation'"));
    assert!(script.contains(r#""tableId":"7""#));
    assert!(script.contains(r#""action":"update""#));
    assert_eq!(calls.last().unwrap(), "wait .table-update-success");
}

#[tokio::test]
async fn test_write_without_confirmation_fails() {
    let page = FakePage::new().with("#table-7");
    let data = json!({"row": 1});

    let outcome = TableOps::new(&page)
        .run("7", TableAction::Write, Some(&data), WAIT)
        .await;

    assert!(!outcome.succeeded());
    let json = serde_json::to_value(&outcome).unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("Timeout waiting for"));
}

#[tokio::test]
async fn test_wait_for_update() {
    let confirmed = FakePage::new().with(".table-update-success");
    let outcome = TableOps::new(&confirmed)
        .run("7", TableAction::WaitForUpdate, None, WAIT)
        .await;
    assert_eq!(outcome, TableOutcome::Updated { success: true });

    let pending = FakePage::new();
    let outcome = TableOps::new(&pending)
        .run("7", TableAction::WaitForUpdate, None, WAIT)
        .await;
    assert_eq!(outcome, TableOutcome::Updated { success: false });
    assert_eq!(serde_json::to_value(&outcome).unwrap(), json!({"success": false}));
}

#[test]
fn test_table_selector() {
    assert_eq!(table_selector("abc"), "#table-abc");
}

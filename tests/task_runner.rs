use std::io::Write;
use std::time::Duration;

use browser_relay::task::{TaskRunner, TaskSpec};
use browser_relay::Error;
use serde_json::json;

#[tokio::test]
async fn test_missing_task_is_rejected() {
    let err = TaskSpec::load(None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidTask(_)));
    assert_eq!(err.to_string(), "No task data provided");

    assert!(TaskSpec::load(Some("")).await.is_err());
}

#[tokio::test]
async fn test_inline_task_runs_and_echoes_id() {
    let spec = TaskSpec::load(Some(
        r#"{"id": 7, "name": "Sign up", "steps": [{"name": "open"}, {}]}"#,
    ))
    .await
    .unwrap();
    assert_eq!(spec.steps.len(), 2);

    let report = TaskRunner::new("chrome", false)
        .with_step_pause(Duration::ZERO)
        .run(&spec)
        .await;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["task_id"], json!(7));
    assert!(json["completed_at"].is_string());
}

#[tokio::test]
async fn test_task_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"id": "task-1", "steps": []}}"#).unwrap();

    let spec = TaskSpec::load(file.path().to_str()).await.unwrap();
    assert_eq!(spec.id, Some(json!("task-1")));
    assert!(spec.steps.is_empty());
}

#[tokio::test]
async fn test_unreadable_or_malformed_task() {
    let missing = TaskSpec::load(Some("/definitely/not/here.json")).await;
    assert!(matches!(missing, Err(Error::Io(_))));

    let malformed = TaskSpec::load(Some("{not json")).await;
    assert!(matches!(malformed, Err(Error::Json(_))));
}

#[tokio::test]
async fn test_task_without_id_reports_null() {
    let spec = TaskSpec::load(Some("{}")).await.unwrap();
    let report = TaskRunner::new("firefox", true).run(&spec).await;
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["task_id"], serde_json::Value::Null);
}

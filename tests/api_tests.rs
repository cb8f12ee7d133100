//! End-to-end tests for the HTTP surface and the background pipeline.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use httpmock::prelude::*;
use tempfile::TempDir;
use tower::util::ServiceExt;

use task_relay::{build_router, AppConfig, AppState, RunState};

fn test_state(root: &TempDir) -> Arc<AppState> {
    Arc::new(AppState::new(AppConfig {
        student_secret: "s3cret".into(),
        github_token: String::new(),
        github_username: "acct".into(),
        gemini_api_key: None,
        tasks_root: root.path().to_path_buf(),
    }))
}

fn ready_body(secret: &str, task: &str, evaluation_url: &str) -> String {
    serde_json::json!({
        "email": "student@example.com",
        "secret": secret,
        "task": task,
        "round": 1,
        "nonce": "n1",
        "brief": "publish the deliverables",
        "evaluation_url": evaluation_url,
        "checks": ["repo exists"],
        "attachments": [
            {"name": "uid", "url": "data:text/plain;base64,c3R1ZGVudC0x"}
        ]
    })
    .to_string()
}

fn post_ready(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ready")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn liveness_reports_running() {
    let root = TempDir::new().unwrap();
    let app = build_router(test_state(&root));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body, serde_json::json!({"status": "running"}));
}

#[tokio::test]
async fn wrong_secret_is_rejected_without_side_effects() {
    let root = TempDir::new().unwrap();
    let evaluator = MockServer::start();
    let mock = evaluator.mock(|when, then| {
        when.method(POST).path("/notify");
        then.status(200);
    });

    let state = test_state(&root);
    let app = build_router(state.clone());

    let response = app
        .oneshot(post_ready(ready_body(
            "wrong",
            "demo task",
            &evaluator.url("/notify"),
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid secret");

    // nothing was scheduled: no run record, no files, no callback
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(state.registry.is_empty());
    assert!(std::fs::read_dir(root.path()).unwrap().next().is_none());
    mock.assert_hits(0);
}

#[tokio::test]
async fn accepted_task_runs_the_pipeline_to_completion() {
    let root = TempDir::new().unwrap();
    let evaluator = MockServer::start();
    let mock = evaluator.mock(|when, then| {
        when.method(POST)
            .path("/notify")
            .json_body_partial(r#"{"task": "demo task", "round": 1}"#);
        then.status(200);
    });

    let state = test_state(&root);
    let app = build_router(state.clone());

    let response = app
        .oneshot(post_ready(ready_body(
            "s3cret",
            "demo task",
            &evaluator.url("/notify"),
        )))
        .await
        .unwrap();

    // acknowledged before the pipeline finishes
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["message"], "Task demo task started.");

    // wait for the background run to call the evaluator
    let mut waited = Duration::ZERO;
    while mock.hits() == 0 && waited < Duration::from_secs(60) {
        tokio::time::sleep(Duration::from_millis(250)).await;
        waited += Duration::from_millis(250);
    }
    mock.assert_hits(1);

    // working copy holds the full deliverable set under the dashed slug
    let dir = root.path().join("demo-task");
    assert_eq!(
        std::fs::read_to_string(dir.join("about.md")).unwrap(),
        "Curious Focused Resilient"
    );
    assert_eq!(
        std::fs::read_to_string(dir.join("uid.txt")).unwrap(),
        "student-1"
    );
    assert!(dir.join("index.html").exists());
    assert!(dir.join(".git").exists());

    // run record reaches a terminal state and is queryable
    let runs = state.registry.list();
    assert_eq!(runs.len(), 1);
    let run = &runs[0];

    let mut waited = Duration::ZERO;
    while state.registry.get(run.id).unwrap().state != RunState::Done
        && waited < Duration::from_secs(10)
    {
        tokio::time::sleep(Duration::from_millis(100)).await;
        waited += Duration::from_millis(100);
    }

    let status_app = build_router(state.clone());
    let response = status_app
        .oneshot(
            Request::builder()
                .uri(format!("/runs/{}", run.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let record = response_json(response).await;
    assert_eq!(record["task"], "demo task");
    assert_eq!(record["state"], "done");
}

#[tokio::test]
async fn unknown_run_id_is_not_found() {
    let root = TempDir::new().unwrap();
    let app = build_router(test_state(&root));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/runs/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

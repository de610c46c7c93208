use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::AppState;
use service::issues::IssueService;
use service::storage::project_store::ProjectFileStore;

fn build_app() -> Router {
    let state = AppState { issues: IssueService::new(ProjectFileStore::in_memory()) };
    server::startup::app(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&v)?)
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body)?).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn health_ok() -> anyhow::Result<()> {
    let app = build_app();
    let (status, body) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn unknown_project_read_is_error_payload() -> anyhow::Result<()> {
    let app = build_app();
    let (status, body) = send(&app, "GET", "/api/issues/ghost", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["error"],
        "This project does not yet exist. Please create an issue for this project first"
    );
    Ok(())
}

#[tokio::test]
async fn json_lifecycle() -> anyhow::Result<()> {
    let app = build_app();
    let (_, created) = send(
        &app,
        "POST",
        "/api/issues/json",
        Some(json!({"issue_title": "T1", "issue_text": "body", "created_by": "Ben"})),
    )
    .await?;
    let id = created["_id"].as_str().unwrap().to_string();
    assert_eq!(created["open"], "true");
    assert_eq!(created["assigned_to"], "");

    let (_, updated) = send(&app, "PUT", "/api/issues/json", Some(json!({"_id": id, "open": false}))).await?;
    assert_eq!(updated, json!({"result": "successfully updated", "_id": id}));

    let (_, listed) = send(&app, "GET", "/api/issues/json?open=false", None).await?;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["_id"], id.as_str());

    let (_, deleted) = send(&app, "DELETE", "/api/issues/json", Some(json!({"_id": id}))).await?;
    assert_eq!(deleted, json!({"result": "successfully deleted", "_id": id}));

    let (_, listed) = send(&app, "GET", "/api/issues/json", None).await?;
    assert_eq!(listed, json!([]));
    Ok(())
}

#[tokio::test]
async fn error_payloads_echo_id() -> anyhow::Result<()> {
    let app = build_app();
    let (_, body) = send(&app, "PUT", "/api/issues/p", Some(json!({"_id": "abc"}))).await?;
    assert_eq!(body, json!({"error": "no update field(s) sent", "_id": "abc"}));

    let (_, body) = send(&app, "PUT", "/api/issues/p", None).await?;
    assert_eq!(body, json!({"error": "missing _id"}));

    let (_, body) = send(&app, "PUT", "/api/issues/p", Some(json!({"_id": "abc", "issue_text": "x"}))).await?;
    assert_eq!(body, json!({"error": "could not update", "_id": "abc"}));

    let (_, body) = send(&app, "DELETE", "/api/issues/p", Some(json!({"_id": "abc"}))).await?;
    assert_eq!(body, json!({"error": "could not delete", "_id": "abc"}));
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_error_payload() -> anyhow::Result<()> {
    let app = build_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/issues/p")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert!(body["error"].as_str().unwrap().starts_with("invalid request body"));
    Ok(())
}

#[tokio::test]
async fn list_query_prefers_canonical_title_key() -> anyhow::Result<()> {
    let app = build_app();
    for title in ["A", "B"] {
        send(
            &app,
            "POST",
            "/api/issues/q",
            Some(json!({"issue_title": title, "issue_text": "t", "created_by": "c"})),
        )
        .await?;
    }
    for uri in ["/api/issues/q?title=A&issue_title=B", "/api/issues/q?issue_title=B&title=A"] {
        let (_, body) = send(&app, "GET", uri, None).await?;
        let arr = body.as_array().expect("array");
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["issue_title"], "B");
    }
    Ok(())
}

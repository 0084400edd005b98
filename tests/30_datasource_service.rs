mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use apptrack::adaptor::FailurePolicy;
use apptrack::api::RestClient;
use apptrack::middleware::SESSION_HEADER;
use apptrack::page::AccessPolicy;
use apptrack::server::{app, AppState};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn state(base_url: &str) -> Result<AppState> {
    let client = RestClient::new(base_url)?;
    Ok(AppState::new(
        Arc::new(client),
        AccessPolicy::new(vec!["AD".to_string()]),
        FailurePolicy::DefaultRecord,
    ))
}

fn service(base_url: &str) -> Result<Router> {
    Ok(app(state(base_url)?))
}

fn session_id(body: &Value) -> String {
    body["data"]["session_id"].as_str().unwrap_or_default().to_string()
}

async fn call(router: &Router, method: Method, uri: &str, session: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder.header(SESSION_HEADER, session);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

async fn open_session(router: &Router, role: &str, filters: Value) -> Result<(StatusCode, Value)> {
    let body = json!({
        "session": {
            "UserID": "jdoe",
            "Name": "Jane Doe",
            "Role": role,
            "LoggedInAt": "2026-01-05T09:00:00Z"
        },
        "filters": filters
    });
    call(router, Method::POST, "/api/session", None, Some(body)).await
}

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let router = service(&backend.base_url)?;

    let (status, body) = call(&router, Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["sessions"], 0);
    Ok(())
}

#[tokio::test]
async fn session_read_filter_roundtrip() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let router = service(&backend.base_url)?;

    let (status, body) = open_session(&router, "AD", json!({ "states": "\"New\"" })).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let session = body["data"]["session_id"].as_str().expect("session id").to_string();

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/grid/states/read?key=grid",
        Some(&session),
        Some(json!({ "requiresCounts": true, "skip": 0, "take": 20 })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["busy"], false);
    assert_eq!(body["degraded"], false);
    assert_eq!(body["data"]["count"], 2);

    let (status, body) = call(
        &router,
        Method::PUT,
        "/api/grid/states/filter",
        Some(&session),
        Some(json!({ "value": "\"Texas\"" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["filter"], "Texas");

    let (_, body) = call(&router, Method::POST, "/api/grid/states/read", Some(&session), Some(json!({}))).await?;
    assert_eq!(body["data"][0]["Name"], "Texas");

    let (status, _) = call(&router, Method::DELETE, "/api/session", Some(&session), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&router, Method::POST, "/api/grid/states/read", Some(&session), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn sessions_do_not_share_filters() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let router = service(&backend.base_url)?;

    let (_, a) = open_session(&router, "AD", json!({ "states": "Texas" })).await?;
    let (_, b) = open_session(&router, "AD", json!({})).await?;
    let a = session_id(&a);
    let b = session_id(&b);

    let read = json!({ "requiresCounts": true });
    let (_, body_a) = call(&router, Method::POST, "/api/grid/states/read", Some(&a), Some(read.clone())).await?;
    let (_, body_b) = call(&router, Method::POST, "/api/grid/states/read", Some(&b), Some(read)).await?;
    assert_eq!(body_a["data"]["count"], 1);
    assert_eq!(body_b["data"]["count"], 3);
    Ok(())
}

#[tokio::test]
async fn non_admin_role_is_forbidden() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let router = service(&backend.base_url)?;

    let (status, body) = open_session(&router, "RC", json!({})).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn unknown_grid_and_missing_session() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let router = service(&backend.base_url)?;

    let (status, _) = call(&router, Method::POST, "/api/grid/states/read", None, Some(json!({}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = open_session(&router, "AD", json!({})).await?;
    let session = session_id(&body);
    let (status, _) = call(&router, Method::POST, "/api/grid/payroll/read", Some(&session), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = open_session(&router, "AD", json!({ "payroll": "x" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn failing_grid_is_degraded_and_busy_grid_returns_null() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let router = service(&backend.base_url)?;
    let (_, body) = open_session(&router, "AD", json!({})).await?;
    let session = session_id(&body);

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/grid/skills/read",
        Some(&session),
        Some(json!({ "requiresCounts": true })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degraded"], true);
    assert_eq!(body["error_code"], "UPSTREAM_STATUS");
    assert_eq!(body["data"]["count"], 1);

    let slow = {
        let router = router.clone();
        let session = session.clone();
        tokio::spawn(async move {
            call(&router, Method::POST, "/api/grid/roles/read", Some(&session), Some(json!({}))).await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, body) = call(&router, Method::POST, "/api/grid/roles/read", Some(&session), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["busy"], true);
    assert_eq!(body["data"], Value::Null);

    let (_, body) = slow.await??;
    assert_eq!(body["busy"], false);
    assert_eq!(body["data"][0]["ID"], "AD");
    Ok(())
}

#[tokio::test]
async fn idle_session_expires_and_is_evicted() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let state = state(&backend.base_url)?.with_idle_timeout(Duration::from_millis(200));
    let router = app(state.clone());

    let (_, body) = open_session(&router, "AD", json!({})).await?;
    let stale = session_id(&body);
    let (_, body) = open_session(&router, "AD", json!({})).await?;
    let abandoned = session_id(&body);
    assert_eq!(state.session_count().await, 2);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let (status, body) = call(&router, Method::POST, "/api/grid/states/read", Some(&stale), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "UNAUTHORIZED");

    // opening a new session sweeps the other idle one
    let (status, _) = open_session(&router, "AD", json!({})).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(state.session_count().await, 1);

    let (status, _) = call(&router, Method::DELETE, "/api/session", Some(&abandoned), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn active_session_stays_alive() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let state = state(&backend.base_url)?.with_idle_timeout(Duration::from_millis(200));
    let router = app(state.clone());

    let (_, body) = open_session(&router, "AD", json!({})).await?;
    let session = session_id(&body);

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let (status, _) = call(&router, Method::POST, "/api/grid/states/read", Some(&session), Some(json!({}))).await?;
        assert_eq!(status, StatusCode::OK);
    }

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(state.evict_idle().await, 1);
    assert_eq!(state.session_count().await, 0);
    Ok(())
}

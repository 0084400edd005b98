#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// Stand-in for the AppTrack backend API, served on a free local port
pub struct FakeBackend {
    pub base_url: String,
    pub hits: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

type Params = Query<HashMap<String, String>>;

const STATES: [(i32, &str, &str); 3] = [(1, "NY", "New York"), (2, "NJ", "New Jersey"), (3, "TX", "Texas")];

fn matching_states(filter: &str) -> Vec<Value> {
    STATES
        .iter()
        .filter(|(_, code, name)| filter.is_empty() || name.contains(filter) || *code == filter)
        .map(|(id, code, name)| json!({ "ID": id, "Code": code, "Name": name, "Country": "US" }))
        .collect()
}

async fn get_states(State(hits): State<Arc<AtomicUsize>>, Query(params): Params) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let filter = params.get("filter").cloned().unwrap_or_default();
    let rows = matching_states(&filter);
    let count = rows.len();
    // the real backend double-encodes the array
    Json(json!({ "States": serde_json::to_string(&rows).unwrap(), "Count": count }))
}

async fn search_state(State(hits): State<Arc<AtomicUsize>>, Query(params): Params) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let filter = params.get("filter").cloned().unwrap_or_default();
    let names: Vec<Value> = matching_states(&filter).into_iter().map(|r| r["Name"].clone()).collect();
    Json(Value::Array(names))
}

async fn get_skills(State(hits): State<Arc<AtomicUsize>>) -> impl IntoResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "skills table offline")
}

async fn get_roles(State(hits): State<Arc<AtomicUsize>>) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(300)).await;
    Json(json!({ "Roles": [{ "ID": "AD", "Name": "Administrator" }], "Count": 1 }))
}

async fn get_users(State(hits): State<Arc<AtomicUsize>>) -> impl IntoResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK
}

async fn echo(Query(params): Params, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "query": params, "body": body }))
}

pub async fn spawn_backend() -> Result<FakeBackend> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let hits = Arc::new(AtomicUsize::new(0));

    let router = Router::new()
        .route("/api/Admin/GetStates", get(get_states))
        .route("/api/Admin/SearchState", get(search_state))
        .route("/api/Admin/GetSkills", get(get_skills))
        .route("/api/Admin/GetRoles", get(get_roles))
        .route("/api/Admin/GetUsers", get(get_users))
        .route("/api/Echo", post(echo))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind fake backend")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(FakeBackend {
        base_url: format!("http://127.0.0.1:{}/api", port),
        hits,
    })
}

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::admin::AdminGrid;
use crate::server::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let grids: Vec<&str> = AdminGrid::ALL.iter().map(|g| g.slug()).collect();

    Json(json!({
        "success": true,
        "data": {
            "name": "AppTrack admin datasource",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "session": "POST|DELETE /api/session",
                "read": "POST /api/grid/:grid/read (session)",
                "suggest": "POST /api/grid/:grid/suggest (session)",
                "filter": "PUT /api/grid/:grid/filter (session)",
            },
            "grids": grids,
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "sessions": state.session_count().await,
        }
    }))
}

use std::collections::BTreeMap;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::admin::AdminGrid;
use crate::error::ApiError;
use crate::middleware::{extract_session_id, ApiResponse, ApiResult};
use crate::page::LoginSession;
use crate::server::{AppState, Workspace};

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub session: LoginSession,
    /// Persisted filter seeds keyed by grid slug
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

/// POST /api/session - open a workspace of initialized admin pages
pub async fn session_open(
    State(state): State<AppState>,
    Json(body): Json<OpenSessionRequest>,
) -> ApiResult<Value> {
    let mut filters = BTreeMap::new();
    for (slug, seed) in body.filters {
        let grid: AdminGrid = slug.parse().map_err(ApiError::bad_request)?;
        filters.insert(grid, seed);
    }

    let user_id = body.session.user_id.clone();
    let workspace = Workspace::open(
        state.client.clone(),
        state.policy,
        &state.access,
        body.session,
        &filters,
    )
    .await?;

    let id = state.insert_workspace(workspace).await;
    tracing::info!("Opened session {} for {}", id, user_id);

    Ok(ApiResponse::created(json!({
        "session_id": id,
        "user_id": user_id,
    })))
}

/// DELETE /api/session - drop the caller's workspace
pub async fn session_close(State(state): State<AppState>, headers: HeaderMap) -> Result<ApiResponse<()>, ApiError> {
    let id = extract_session_id(&headers).map_err(ApiError::unauthorized)?;
    match state.remove_workspace(&id).await {
        Some(workspace) => {
            tracing::info!("Closed session {} for {}", id, workspace.session().user_id);
            Ok(ApiResponse::<()>::no_content())
        }
        None => Err(ApiError::not_found(format!("Session {} not found", id))),
    }
}

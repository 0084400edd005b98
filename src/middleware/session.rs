use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::{AppState, Workspace};

pub const SESSION_HEADER: &str = "x-apptrack-session";

/// The caller's workspace, resolved from the session header
pub struct CurrentWorkspace {
    pub id: Uuid,
    pub workspace: Arc<Workspace>,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentWorkspace {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = extract_session_id(&parts.headers).map_err(ApiError::unauthorized)?;
        let workspace = state
            .workspace(&id)
            .await
            .ok_or_else(|| ApiError::unauthorized("Unknown or expired session"))?;
        Ok(Self { id, workspace })
    }
}

pub fn extract_session_id(headers: &HeaderMap) -> Result<Uuid, String> {
    let raw = headers
        .get(SESSION_HEADER)
        .ok_or_else(|| format!("Missing {} header", SESSION_HEADER))?
        .to_str()
        .map_err(|_| format!("Invalid {} header encoding", SESSION_HEADER))?;

    Uuid::parse_str(raw.trim()).map_err(|_| format!("Invalid session id: {}", raw))
}

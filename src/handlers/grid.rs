use axum::{
    extract::{Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::adaptor::ReadRequest;
use crate::admin::AdminGrid;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentWorkspace, GridResponse};
use crate::page::AdminPage;

#[derive(Debug, Default, Deserialize)]
pub struct ReadQuery {
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilterChange {
    pub value: Option<String>,
}

fn resolve_page<'a>(current: &'a CurrentWorkspace, slug: &str) -> Result<&'a AdminPage, ApiError> {
    let grid: AdminGrid = slug.parse().map_err(ApiError::not_found)?;
    current
        .workspace
        .page(grid)
        .ok_or_else(|| ApiError::not_found(format!("Grid {} is not open in this session", grid)))
}

/// POST /api/grid/:grid/read - one datasource read for the grid widget
pub async fn grid_read(
    Path(slug): Path<String>,
    Query(query): Query<ReadQuery>,
    current: CurrentWorkspace,
    Json(request): Json<ReadRequest>,
) -> Result<GridResponse, ApiError> {
    let page = resolve_page(&current, &slug)?;
    let outcome = page.read(&request, query.key.as_deref()).await;
    Ok(GridResponse(outcome))
}

/// POST /api/grid/:grid/suggest - autocomplete read for the page's search box
pub async fn grid_suggest(
    Path(slug): Path<String>,
    current: CurrentWorkspace,
    Json(request): Json<ReadRequest>,
) -> Result<GridResponse, ApiError> {
    let page = resolve_page(&current, &slug)?;
    Ok(GridResponse(page.suggest(&request).await))
}

/// PUT /api/grid/:grid/filter - search box change; persists the seed
pub async fn grid_filter(
    Path(slug): Path<String>,
    current: CurrentWorkspace,
    Json(change): Json<FilterChange>,
) -> ApiResult<Value> {
    let page = resolve_page(&current, &slug)?;
    let filter = page
        .persist_filter(current.workspace.store(), change.value.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist filter for {}: {}", page.grid(), e);
            ApiError::internal_server_error("Failed to persist filter")
        })?;

    Ok(ApiResponse::success(json!({
        "grid": page.grid(),
        "filter": filter,
    })))
}

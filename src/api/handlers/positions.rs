use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::position_repo::{self, PositionFilter};
use crate::errors::AppError;
use crate::ledger::parse_outcome;
use crate::models::{ContractPosition, PageRequest, Pagination, PositionStatus, PositionWithOwner, SortOrder};
use crate::AppState;

use super::{json_body, path_param, query_params, ApiResponse, PagedResponse};

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListPositionsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(alias = "userId")]
    pub user_id: Option<i32>,
    pub status: Option<String>,
    pub search: Option<String>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(alias = "sortOrder")]
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    pub result: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/contract-positions — paginated listing with owner e-mail
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListPositionsQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<PositionWithOwner>>, AppError> {
    let query = query_params(query)?;
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<PositionStatus>()
                .map_err(|_| AppError::InvalidArgument(format!("unknown status: {raw}")))?,
        ),
        None => None,
    };

    let filter = PositionFilter {
        user_id: query.user_id,
        status,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };
    let page = PageRequest::new(query.page, query.limit);

    let (positions, total) = position_repo::list_positions(
        &state.db,
        &filter,
        page,
        query.sort_by.as_deref(),
        SortOrder::from_param(query.sort_order.as_deref()),
    )
    .await?;

    Ok(Json(PagedResponse {
        success: true,
        data: positions,
        pagination: Pagination::new(page, total),
    }))
}

/// GET /api/contract-positions/{id}
pub async fn detail(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<PositionWithOwner>>, AppError> {
    let id = path_param(id)?;
    let position = position_repo::get_position_with_owner(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Position not found".into()))?;

    Ok(ApiResponse::ok(position))
}

/// PUT /api/contract-positions/{id} — force WIN/LOSS on an open, unexpired position
pub async fn settle(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<SettleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ContractPosition>>, AppError> {
    let id = path_param(id)?;
    let body = json_body(body)?;
    let forced = parse_outcome(body.result.as_deref().unwrap_or_default())?;

    let position = state.settlement.settle_position(id, forced).await?;

    Ok(ApiResponse::ok(position))
}

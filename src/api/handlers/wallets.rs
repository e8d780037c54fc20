use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::wallet_repo::{self, WalletFilter};
use crate::errors::AppError;
use crate::models::{PageRequest, Pagination, SortOrder, WalletWithOwner};
use crate::AppState;

use super::{query_params, PagedResponse};

#[derive(Debug, Default, Deserialize)]
pub struct ListWalletsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(alias = "userId")]
    pub user_id: Option<i32>,
    pub asset: Option<String>,
    pub search: Option<String>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(alias = "sortOrder")]
    pub sort_order: Option<String>,
}

/// GET /api/wallets
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListWalletsQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<WalletWithOwner>>, AppError> {
    let query = query_params(query)?;
    let filter = WalletFilter {
        user_id: query.user_id,
        asset: query.asset.filter(|a| !a.is_empty()),
        search: query.search.filter(|s| !s.trim().is_empty()),
    };
    let page = PageRequest::new(query.page, query.limit);

    let (wallets, total) = wallet_repo::list_wallets(
        &state.db,
        &filter,
        page,
        query.sort_by.as_deref(),
        SortOrder::from_param(query.sort_order.as_deref()),
    )
    .await?;

    Ok(Json(PagedResponse {
        success: true,
        data: wallets,
        pagination: Pagination::new(page, total),
    }))
}

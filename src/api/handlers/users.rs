use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::ledger::{AdjustmentKind, BalanceAdjustment};
use crate::models::Wallet;
use crate::AppState;

use super::{json_body, path_param};

#[derive(Debug, Deserialize)]
pub struct AdjustBalanceRequest {
    pub asset: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct AdjustBalanceResponse {
    pub success: bool,
    pub data: Wallet,
    pub message: String,
    pub adjustment: BalanceAdjustment,
}

/// POST /api/users/{id}/adjust-balance — manual credit/debit of a wallet's available balance
pub async fn adjust_balance(
    State(state): State<AppState>,
    user_id: Result<Path<i32>, PathRejection>,
    body: Result<Json<AdjustBalanceRequest>, JsonRejection>,
) -> Result<Json<AdjustBalanceResponse>, AppError> {
    let user_id = path_param(user_id)?;
    let body = json_body(body)?;

    let (Some(asset), Some(amount), Some(kind)) = (body.asset, body.amount, body.kind) else {
        return Err(AppError::InvalidArgument(
            "Missing required fields: asset, amount, type".into(),
        ));
    };
    let kind: AdjustmentKind = kind
        .parse()
        .map_err(|_| AppError::InvalidArgument("type must be 'add' or 'subtract'".into()))?;

    let adjustment = state
        .balances
        .adjust(user_id, &asset, amount, kind, body.reason)
        .await?;

    let message = match kind {
        AdjustmentKind::Add => "Balance added successfully",
        AdjustmentKind::Subtract => "Balance subtracted successfully",
    };

    Ok(Json(AdjustBalanceResponse {
        success: true,
        data: adjustment.wallet.clone(),
        message: message.into(),
        adjustment,
    }))
}

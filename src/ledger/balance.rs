use metrics::counter;
use rust_decimal::RoundingStrategy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;

use crate::db::{user_repo, wallet_repo};
use crate::errors::LedgerError;
use crate::models::{UnknownVariant, Wallet};

pub const DEFAULT_ADJUSTMENT_REASON: &str = "Manual adjustment by administrator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    Add,
    Subtract,
}

impl AdjustmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentKind::Add => "add",
            AdjustmentKind::Subtract => "subtract",
        }
    }
}

impl FromStr for AdjustmentKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(AdjustmentKind::Add),
            "subtract" => Ok(AdjustmentKind::Subtract),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceAdjustment {
    #[serde(skip)]
    pub wallet: Wallet,
    #[serde(rename = "type")]
    pub kind: AdjustmentKind,
    pub amount: Decimal,
    pub reason: String,
}

/// Manual credits and debits of a wallet's available balance.
#[derive(Clone)]
pub struct BalanceAdjuster {
    pool: PgPool,
    scale: u32,
}

impl BalanceAdjuster {
    pub fn new(pool: PgPool, scale: u32) -> Self {
        Self { pool, scale }
    }

    pub async fn adjust(
        &self,
        user_id: i32,
        asset: &str,
        amount: Decimal,
        kind: AdjustmentKind,
        reason: Option<String>,
    ) -> Result<BalanceAdjustment, LedgerError> {
        let asset = asset.trim();
        if asset.is_empty() {
            return Err(LedgerError::InvalidArgument("asset is required".into()));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidArgument("amount must be positive".into()));
        }
        let amount = amount.round_dp_with_strategy(self.scale, RoundingStrategy::MidpointNearestEven);
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADJUSTMENT_REASON.to_string());

        let mut tx = self.pool.begin().await?;

        if !user_repo::user_exists(&mut tx, user_id).await? {
            return Err(LedgerError::NotFound("User".into()));
        }

        let wallet = wallet_repo::lock_or_create(&mut tx, user_id, asset).await?;
        let available = match kind {
            AdjustmentKind::Add => wallet.available + amount,
            AdjustmentKind::Subtract => {
                if wallet.available < amount {
                    return Err(LedgerError::InvalidState("Insufficient balance".into()));
                }
                wallet.available - amount
            }
        };

        let updated = wallet_repo::set_balances(&mut tx, wallet.id, available, wallet.locked).await?;
        tx.commit().await?;

        counter!("balance_adjustments_total", "type" => kind.as_str()).increment(1);
        tracing::info!(
            user_id,
            wallet_id = updated.id,
            asset,
            kind = kind.as_str(),
            amount = %amount,
            available = %updated.available,
            reason = %reason,
            "Wallet balance adjusted"
        );

        Ok(BalanceAdjustment {
            wallet: updated,
            kind,
            amount,
            reason,
        })
    }
}

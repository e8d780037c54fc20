use chrono::{DateTime, Utc};
use metrics::counter;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::{position_repo, wallet_repo};
use crate::errors::LedgerError;
use crate::models::{ContractPosition, Outcome};

use super::payout::{apply_payout, compute_payout, PayoutParams};

/// Closes open contract positions with a forced outcome and books the P/L
/// into the owner's wallet.
#[derive(Clone)]
pub struct SettlementEngine {
    pool: PgPool,
    asset: String,
    params: PayoutParams,
}

impl SettlementEngine {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        Self {
            pool,
            asset: config.settlement_asset.clone(),
            params: PayoutParams {
                policy: config.payout_policy,
                fee_rate: config.platform_fee_rate,
                scale: config.balance_scale,
            },
        }
    }

    pub async fn settle_position(
        &self,
        position_id: i32,
        forced: Outcome,
    ) -> Result<ContractPosition, LedgerError> {
        self.settle_position_at(position_id, forced, Utc::now()).await
    }

    /// Settle as of `now`. Preconditions are checked against the locked row,
    /// so a second concurrent call for the same id sees the first one's result.
    pub async fn settle_position_at(
        &self,
        position_id: i32,
        forced: Outcome,
        now: DateTime<Utc>,
    ) -> Result<ContractPosition, LedgerError> {
        match self.settle_in_tx(position_id, forced, now).await {
            Ok(position) => {
                counter!("positions_settled_total", "result" => forced.as_str()).increment(1);
                Ok(position)
            }
            Err(e) => {
                counter!("settlement_rejections_total", "reason" => e.kind()).increment(1);
                tracing::warn!(
                    position_id,
                    result = %forced,
                    error = %e,
                    "Settlement rejected"
                );
                Err(e)
            }
        }
    }

    async fn settle_in_tx(
        &self,
        position_id: i32,
        forced: Outcome,
        now: DateTime<Utc>,
    ) -> Result<ContractPosition, LedgerError> {
        let mut tx = self.pool.begin().await?;

        let position = position_repo::lock_position(&mut tx, position_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Position".into()))?;

        if !position.is_adjustable_at(now) {
            return Err(if position.is_open() {
                LedgerError::Expired("cannot adjust an already-expired position".into())
            } else {
                LedgerError::InvalidState("only open positions may be settled".into())
            });
        }

        let payout = compute_payout(&self.params, position.amount, position.profitability, forced);

        let wallet = wallet_repo::lock_or_create(&mut tx, position.user_id, &self.asset).await?;
        let change = apply_payout(wallet.available, wallet.locked, &payout);
        if !change.is_exact() {
            tracing::warn!(
                position_id,
                wallet_id = wallet.id,
                locked_shortfall = %change.locked_shortfall,
                available_shortfall = %change.available_shortfall,
                "Wallet could not absorb the full settlement; balances floored at zero"
            );
        }

        wallet_repo::set_balances(&mut tx, wallet.id, change.available, change.locked).await?;
        let closed =
            position_repo::close_position(&mut tx, position_id, forced, payout.actual_profit, now)
                .await?;

        tx.commit().await?;

        tracing::info!(
            position_id,
            user_id = closed.user_id,
            result = %forced,
            amount = %closed.amount,
            actual_profit = %payout.actual_profit,
            available = %change.available,
            locked = %change.locked,
            "Position settled"
        );

        Ok(closed)
    }
}

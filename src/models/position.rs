use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Outcome, PositionSide, PositionStatus};

/// Database row for contract_positions table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContractPosition {
    pub id: i32,
    pub user_id: i32,
    pub symbol: String,
    pub side: PositionSide,
    pub amount: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    /// Payout rate in percent. `None` means even money.
    pub profitability: Option<Decimal>,
    pub status: PositionStatus,
    pub result: Option<Outcome>,
    pub actual_profit: Option<Decimal>,
    pub expires_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ContractPosition {
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Open and not yet expired: the only window in which an outcome may be forced.
    pub fn is_adjustable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && !self.is_expired_at(now)
    }
}

/// Listing row: position plus the owner's e-mail.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PositionWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub position: ContractPosition,
    pub user_email: Option<String>,
}

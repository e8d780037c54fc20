use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database row for wallets table. One per (user_id, asset).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Wallet {
    pub id: i32,
    pub user_id: i32,
    pub asset: String,
    pub available: Decimal,
    pub locked: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WalletWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub wallet: Wallet,
    pub user_email: Option<String>,
}

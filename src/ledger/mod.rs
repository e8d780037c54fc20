//! Contract settlement and wallet ledger.
//!
//! Every mutating operation here runs inside a single database transaction
//! obtained from the pool handed to the component at construction. A
//! `sqlx::Transaction` that is dropped without `commit` rolls back, so every
//! early `?` return leaves storage untouched.

pub mod balance;
pub mod payout;
pub mod session_queue;
pub mod settlement;

pub use balance::{AdjustmentKind, BalanceAdjuster, BalanceAdjustment};
pub use payout::{Payout, PayoutPolicy};
pub use session_queue::SessionQueue;
pub use settlement::SettlementEngine;

use crate::errors::LedgerError;
use crate::models::Outcome;

/// Boundary validation for a forced result coming from a client.
pub fn parse_outcome(raw: &str) -> Result<Outcome, LedgerError> {
    raw.parse()
        .map_err(|_| LedgerError::InvalidArgument("result must be WIN or LOSS".into()))
}

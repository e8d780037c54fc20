use rust_decimal::RoundingStrategy;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::{Outcome, UnknownVariant};

/// Payout rate applied when a position carries no profitability: even money.
const DEFAULT_RATE_PCT: Decimal = Decimal::ONE_HUNDRED;

/// How a forced outcome is turned into profit and balance movements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayoutPolicy {
    /// Profit is `amount * rate%` less a platform fee on the profit; a loss
    /// forfeits the would-be profit plus the fee, not the whole stake.
    #[default]
    RateBased,
    /// Older even-money model: win doubles the stake, loss forfeits it.
    /// Ignores profitability and fee.
    LegacyFlat,
}

impl FromStr for PayoutPolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rate" | "rate_based" => Ok(PayoutPolicy::RateBased),
            "flat" | "legacy_flat" => Ok(PayoutPolicy::LegacyFlat),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Result of settling one position, before it is applied to a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub gross_profit: Decimal,
    pub fee: Decimal,
    /// Signed P/L recorded on the position.
    pub actual_profit: Decimal,
    /// Amount to release from `locked` (the stake).
    pub locked_release: Decimal,
    /// Signed amount to add to `available`.
    pub available_credit: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutParams {
    pub policy: PayoutPolicy,
    pub fee_rate: Decimal,
    pub scale: u32,
}

pub fn compute_payout(
    params: &PayoutParams,
    amount: Decimal,
    profitability: Option<Decimal>,
    outcome: Outcome,
) -> Payout {
    let payout = match params.policy {
        PayoutPolicy::RateBased => {
            let rate = profitability.unwrap_or(DEFAULT_RATE_PCT);
            let gross = amount * rate / Decimal::ONE_HUNDRED;
            let fee = gross * params.fee_rate;
            let net = gross - fee;

            match outcome {
                Outcome::Win => Payout {
                    gross_profit: gross,
                    fee,
                    actual_profit: net,
                    locked_release: amount,
                    available_credit: amount + net,
                },
                Outcome::Loss => Payout {
                    gross_profit: gross,
                    fee,
                    actual_profit: -(gross + fee),
                    locked_release: amount,
                    available_credit: amount - gross - fee,
                },
            }
        }
        PayoutPolicy::LegacyFlat => match outcome {
            Outcome::Win => Payout {
                gross_profit: amount,
                fee: Decimal::ZERO,
                actual_profit: amount,
                locked_release: amount,
                available_credit: amount + amount,
            },
            Outcome::Loss => Payout {
                gross_profit: amount,
                fee: Decimal::ZERO,
                actual_profit: -amount,
                locked_release: amount,
                available_credit: Decimal::ZERO,
            },
        },
    };

    payout.rounded(params.scale)
}

impl Payout {
    fn rounded(self, scale: u32) -> Self {
        let r = |d: Decimal| d.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven);
        Self {
            gross_profit: r(self.gross_profit),
            fee: r(self.fee),
            actual_profit: r(self.actual_profit),
            locked_release: r(self.locked_release),
            available_credit: r(self.available_credit),
        }
    }
}

/// Wallet balances after a payout is applied.
///
/// Neither balance may go below zero: `locked` releases at most what it holds
/// and a negative credit takes at most what `available` holds. Any part that
/// could not be applied is reported as a shortfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    pub available: Decimal,
    pub locked: Decimal,
    pub locked_shortfall: Decimal,
    pub available_shortfall: Decimal,
}

impl BalanceChange {
    pub fn is_exact(&self) -> bool {
        self.locked_shortfall.is_zero() && self.available_shortfall.is_zero()
    }
}

pub fn apply_payout(available: Decimal, locked: Decimal, payout: &Payout) -> BalanceChange {
    let release = payout.locked_release.min(locked);
    let new_locked = locked - release;

    let raw_available = available + payout.available_credit;
    let new_available = raw_available.max(Decimal::ZERO);

    BalanceChange {
        available: new_available,
        locked: new_locked,
        locked_shortfall: payout.locked_release - release,
        available_shortfall: new_available - raw_available,
    }
}

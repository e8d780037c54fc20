pub mod pagination;
pub mod position;
pub mod session_control;
pub mod wallet;

pub use pagination::{PageRequest, Pagination, SortOrder};
pub use position::{ContractPosition, PositionWithOwner};
pub use session_control::{QueueMode, SessionControl};
pub use wallet::{Wallet, WalletWithOwner};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Binary result of a contract position, also the payload of a session-control entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "trade_result", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "WIN",
            Outcome::Loss => "LOSS",
        }
    }
}

impl FromStr for Outcome {
    type Err = UnknownVariant;

    /// Strict: only the exact upper-case forms are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WIN" => Ok(Outcome::Win),
            "LOSS" => Ok(Outcome::Loss),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PositionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "position_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionStatus {
    Open,
    Closed,
}

impl PositionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionStatus::Open => "OPEN",
            PositionStatus::Closed => "CLOSED",
        }
    }
}

impl FromStr for PositionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPEN" => Ok(PositionStatus::Open),
            "CLOSED" => Ok(PositionStatus::Closed),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PositionSide
// ---------------------------------------------------------------------------

/// Direction of the bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "position_side", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    BuyUp,
    BuyDown,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_parse_is_strict() {
        assert_eq!("WIN".parse::<Outcome>(), Ok(Outcome::Win));
        assert_eq!("LOSS".parse::<Outcome>(), Ok(Outcome::Loss));
        assert!("win".parse::<Outcome>().is_err());
        assert!("DRAW".parse::<Outcome>().is_err());
        assert!("".parse::<Outcome>().is_err());
    }

    #[test]
    fn test_status_parse_ignores_case() {
        assert_eq!("open".parse::<PositionStatus>(), Ok(PositionStatus::Open));
        assert_eq!("CLOSED".parse::<PositionStatus>(), Ok(PositionStatus::Closed));
        assert!("EXPIRED".parse::<PositionStatus>().is_err());
    }

    #[test]
    fn test_outcome_serializes_upper_case() {
        let json = serde_json::to_string(&Outcome::Loss).unwrap();
        assert_eq!(json, "\"LOSS\"");
        let side = serde_json::to_string(&PositionSide::BuyDown).unwrap();
        assert_eq!(side, "\"BUY_DOWN\"");
    }
}

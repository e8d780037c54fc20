use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

use super::{Outcome, UnknownVariant};

/// Database row for contract_session_controls table.
///
/// An entry with `required = true` is pending; the active queue is all pending
/// entries ordered by `created_at`, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionControl {
    pub id: i32,
    #[serde(rename = "final")]
    pub final_outcome: Outcome,
    pub required: bool,
    pub created_at: DateTime<Utc>,
}

/// How a new forced outcome is added to the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueMode {
    /// Retire every pending entry, then insert the new one.
    #[default]
    Reset,
    /// Insert at the tail, leaving pending entries untouched.
    Append,
}

impl QueueMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueMode::Reset => "reset",
            QueueMode::Append => "append",
        }
    }
}

impl FromStr for QueueMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reset" => Ok(QueueMode::Reset),
            "append" => Ok(QueueMode::Append),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Postgres SQLSTATE codes that mean "another writer got there first".
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const UNIQUE_VIOLATION: &str = "23505";

/// Failures of ledger operations (settlement, session control, balance adjustment).
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Expired(String),

    #[error("concurrent update conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(sqlx::Error),
}

impl LedgerError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::NotFound(_) => "not_found",
            LedgerError::InvalidArgument(_) => "invalid_argument",
            LedgerError::InvalidState(_) => "invalid_state",
            LedgerError::Expired(_) => "expired",
            LedgerError::Conflict(_) => "conflict",
            LedgerError::Storage(_) => "storage",
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if let Some(code) = db.code() {
                if matches!(&*code, SERIALIZATION_FAILURE | DEADLOCK_DETECTED | UNIQUE_VIOLATION) {
                    return LedgerError::Conflict(db.message().to_string());
                }
            }
        }
        LedgerError::Storage(e)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Expired: {0}")]
    Expired(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidArgument(_) | AppError::InvalidState(_) | AppError::Expired(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::NotFound(msg)
            | AppError::InvalidArgument(msg)
            | AppError::InvalidState(msg)
            | AppError::Expired(msg)
            | AppError::Conflict(msg) => msg,
            AppError::Unauthorized => "Unauthorized".into(),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "Internal server error".into()
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            LedgerError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            LedgerError::InvalidState(msg) => AppError::InvalidState(msg),
            LedgerError::Expired(msg) => AppError::Expired(msg),
            LedgerError::Conflict(msg) => AppError::Conflict(msg),
            LedgerError::Storage(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

//! RPC error types and their HTTP rendering.
//!
//! Every failure leaves the server as `{success:false, code, error}`.
//! Storage and internal details are logged here and replaced with a generic
//! message in the body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tally_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{0}")]
    Validation(String),

    #[error("this voter has already voted on question {0}")]
    DuplicateVote(String),

    #[error("poll already exists: {0}")]
    DuplicatePoll(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("forbidden")]
    Forbidden,

    #[error("rate limited")]
    RateLimited,

    #[error("audit chain broken at entry {sequence}: {reason}")]
    Integrity { sequence: u64, reason: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::Validation(_) => StatusCode::BAD_REQUEST,
            RpcError::DuplicateVote(_) | RpcError::DuplicatePoll(_) => StatusCode::CONFLICT,
            RpcError::NotFound(_) => StatusCode::NOT_FOUND,
            RpcError::Forbidden => StatusCode::FORBIDDEN,
            RpcError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            RpcError::Integrity { .. } | RpcError::Storage(_) | RpcError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code carried in the body.
    pub fn code(&self) -> &'static str {
        match self {
            RpcError::Validation(_) => "VALIDATION_ERROR",
            RpcError::DuplicateVote(_) => "DUPLICATE_VOTE",
            RpcError::DuplicatePoll(_) => "DUPLICATE_POLL",
            RpcError::NotFound(_) => "NOT_FOUND",
            RpcError::Forbidden => "FORBIDDEN",
            RpcError::RateLimited => "RATE_LIMITED",
            RpcError::Integrity { .. } => "INTEGRITY_ERROR",
            RpcError::Storage(_) => "STORAGE_ERROR",
            RpcError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            RpcError::Storage(_) => "storage is temporarily unavailable, retry later".into(),
            RpcError::Internal(_) => "internal server error".into(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    code: &'static str,
    error: String,
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        match &self {
            RpcError::Storage(detail) => tracing::error!(%detail, "storage failure"),
            RpcError::Internal(detail) => tracing::error!(%detail, "internal failure"),
            RpcError::Integrity { sequence, reason } => {
                tracing::error!(sequence, %reason, "audit chain integrity failure")
            }
            _ => {}
        }
        let body = ErrorBody {
            success: false,
            code: self.code(),
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<LedgerError> for RpcError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Validation(msg) => RpcError::Validation(msg),
            LedgerError::DuplicateVote { question_id } => RpcError::DuplicateVote(question_id),
            LedgerError::DuplicatePoll(id) => RpcError::DuplicatePoll(id),
            LedgerError::NotFound(what) => RpcError::NotFound(what),
            LedgerError::Integrity { sequence, reason } => RpcError::Integrity {
                sequence,
                reason: reason.to_string(),
            },
            LedgerError::Payload(e) => RpcError::Internal(e.to_string()),
            LedgerError::Storage(e) => RpcError::Storage(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for RpcError {
    fn from(e: tokio::task::JoinError) -> Self {
        RpcError::Internal(format!("blocking task failed: {e}"))
    }
}

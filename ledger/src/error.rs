use thiserror::Error;

use crate::ChainBreak;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("voter has already voted on question {question_id}")]
    DuplicateVote { question_id: String },

    #[error("poll already exists: {0}")]
    DuplicatePoll(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("audit chain broken at entry {sequence}: {reason}")]
    Integrity { sequence: u64, reason: ChainBreak },

    #[error("could not encode audit payload: {0}")]
    Payload(#[from] tally_types::TypesError),

    #[error("storage error: {0}")]
    Storage(#[from] tally_store::StoreError),
}

impl LedgerError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }
}

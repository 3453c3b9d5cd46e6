use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid audit hash: {0}")]
    InvalidHash(String),

    #[error("payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),
}

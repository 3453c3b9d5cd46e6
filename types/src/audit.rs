//! Audit chain entries.

use serde::{Deserialize, Serialize};

use crate::{AuditHash, Timestamp, TypesError, Vote, VoteId};

/// The snapshot that gets hashed into the chain: the accepted vote plus the
/// acceptance time.
#[derive(Serialize)]
pub struct AuditPayload<'a> {
    pub vote: &'a Vote,
    pub timestamp: Timestamp,
}

impl<'a> AuditPayload<'a> {
    pub fn new(vote: &'a Vote, timestamp: Timestamp) -> Self {
        Self { vote, timestamp }
    }

    /// Serialize to the exact JSON text stored in, and hashed for, the entry.
    pub fn to_json(&self) -> Result<String, TypesError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Append-only record proving a vote was accepted at a point in history.
///
/// `hash = SHA-256(previous_hash_hex || payload || salt)` where a missing
/// predecessor contributes the empty string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// 0-based position in the chain.
    pub sequence: u64,
    pub vote_reference: VoteId,
    pub payload: String,
    pub previous_hash: Option<AuditHash>,
    pub hash: AuditHash,
    pub created_at: Timestamp,
}

impl AuditEntry {
    /// Key bytes for the audit database (big-endian sequence).
    pub fn key(&self) -> [u8; 8] {
        self.sequence.to_be_bytes()
    }

    /// The predecessor hash as fed into the digest (empty for the first entry).
    pub fn previous_hex(&self) -> String {
        self.previous_hash.map(|h| h.to_hex()).unwrap_or_default()
    }
}

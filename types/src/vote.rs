//! Ballots (what a client submits) and votes (what the ledger stores).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Timestamp;

/// Store-assigned identifier of an accepted vote.
///
/// Monotonically increasing; doubles as the vote's key in the store and as
/// the `voteReference` of the audit entry certifying it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteId(u64);

impl VoteId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Big-endian key bytes; keeps LMDB iteration in insertion order.
    pub fn to_key(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for VoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unvalidated vote request as it arrives from a client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    #[serde(default)]
    pub question_id: Option<String>,
    #[serde(default)]
    pub choice: Option<String>,
    /// Older poll clients send this as `visitorId`.
    #[serde(default, alias = "visitorId")]
    pub voter_id: Option<String>,
}

impl Ballot {
    pub fn new(
        question_id: impl Into<String>,
        choice: impl Into<String>,
        voter_id: impl Into<String>,
    ) -> Self {
        Self {
            question_id: Some(question_id.into()),
            choice: Some(choice.into()),
            voter_id: Some(voter_id.into()),
        }
    }
}

/// One ballot cast by one voter for one question, as accepted by the ledger.
///
/// `(voter_id, question_id)` is unique across the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub question_id: String,
    pub choice: String,
    pub voter_id: String,
    pub created_at: Timestamp,
}

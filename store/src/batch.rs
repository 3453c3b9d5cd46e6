//! Scoped write transactions.

use crate::{AuditStore, PollStore, StoreError, VoteStore};
use tally_types::{AuditEntry, Poll, Vote, VoteId};

/// A writable unit of work over the ledger.
///
/// Reads made through the batch see its own staged writes. Nothing becomes
/// visible to other readers until [`LedgerBatch::commit`]; dropping the
/// batch discards everything.
pub trait LedgerBatch {
    /// The most recent audit entry as seen by this batch.
    fn latest_audit(&self) -> Result<Option<AuditEntry>, StoreError>;

    /// Insert a vote, assigning the next [`VoteId`].
    ///
    /// Fails with [`StoreError::Duplicate`] if `(voter_id, question_id)`
    /// already has a vote. The batch stays usable but the caller is
    /// expected to drop it.
    fn insert_vote(&mut self, vote: &Vote) -> Result<VoteId, StoreError>;

    /// Append an entry to the audit chain.
    ///
    /// `entry.sequence` must be exactly one past the current latest entry
    /// (or 0 for an empty chain); anything else is [`StoreError::Corruption`].
    fn append_audit(&mut self, entry: &AuditEntry) -> Result<(), StoreError>;

    /// A registered poll as seen by this batch.
    fn get_poll(&self, question_id: &str) -> Result<Option<Poll>, StoreError>;

    /// Open or close a registered poll and return it as updated.
    /// Fails with [`StoreError::NotFound`] for an unknown question id.
    fn set_poll_active(&mut self, question_id: &str, active: bool) -> Result<Poll, StoreError>;

    /// Register a poll. Fails with [`StoreError::Duplicate`] if the
    /// question id is taken.
    fn insert_poll(&mut self, poll: &Poll) -> Result<(), StoreError>;

    /// Make every staged write durable and visible, atomically.
    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;

    /// Sequence number the next appended audit entry must carry.
    fn next_audit_sequence(&self) -> Result<u64, StoreError> {
        Ok(self.latest_audit()?.map(|e| e.sequence + 1).unwrap_or(0))
    }
}

/// A complete ledger backend: read traits plus the write batch factory.
pub trait LedgerStore: VoteStore + AuditStore + PollStore + Send + Sync {
    type Batch<'a>: LedgerBatch
    where
        Self: 'a;

    /// Open a write batch, blocking until no other batch is open.
    fn write_batch(&self) -> Result<Self::Batch<'_>, StoreError>;
}

//! Write batching: groups the store operations of one ledger mutation into
//! a single LMDB write transaction.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = env.write_batch()?;
//! let previous = batch.latest_audit()?;
//! let vote_id = batch.insert_vote(&vote)?;
//! batch.append_audit(&entry)?;
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], all
//! operations are rolled back (the underlying LMDB transaction is aborted).
//! LMDB allows one write transaction at a time, so holding a batch is
//! holding the ledger's write lock.

use heed::RwTxn;

use tally_store::{LedgerBatch, StoreError};
use tally_types::{AuditEntry, Poll, Vote, VoteId};

use crate::environment::LmdbEnvironment;
use crate::keys::{decode_u64, vote_index_key};
use crate::LmdbError;

/// A write batch over one LMDB write transaction.
pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> WriteBatch<'a> {
    /// Begin a new write batch.
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env().write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env })
    }

    fn next_vote_id(&self) -> Result<VoteId, StoreError> {
        let last = self
            .env
            .votes_db
            .last(&self.txn)
            .map_err(LmdbError::from)?;
        match last {
            Some((key, _)) => {
                let id = decode_u64(key)
                    .ok_or_else(|| StoreError::Corruption("vote key is not 8 bytes".into()))?;
                Ok(VoteId::new(id + 1))
            }
            None => Ok(VoteId::new(0)),
        }
    }
}

impl LedgerBatch for WriteBatch<'_> {
    fn latest_audit(&self) -> Result<Option<AuditEntry>, StoreError> {
        let last = self
            .env
            .audit_db
            .last(&self.txn)
            .map_err(LmdbError::from)?;
        match last {
            Some((_, val)) => {
                let entry: AuditEntry = bincode::deserialize(val).map_err(LmdbError::from)?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    fn insert_vote(&mut self, vote: &Vote) -> Result<VoteId, StoreError> {
        let index_key = vote_index_key(&vote.question_id, &vote.voter_id);
        let existing = self
            .env
            .vote_index_db
            .get(&self.txn, &index_key)
            .map_err(LmdbError::from)?;
        if existing.is_some() {
            return Err(StoreError::Duplicate(format!(
                "vote for question '{}'",
                vote.question_id
            )));
        }

        let id = self.next_vote_id()?;
        let bytes = bincode::serialize(vote).map_err(LmdbError::from)?;
        self.env
            .votes_db
            .put(&mut self.txn, &id.to_key(), &bytes)
            .map_err(LmdbError::from)?;
        self.env
            .vote_index_db
            .put(&mut self.txn, &index_key, &id.to_key())
            .map_err(LmdbError::from)?;
        Ok(id)
    }

    fn append_audit(&mut self, entry: &AuditEntry) -> Result<(), StoreError> {
        let expected = self.next_audit_sequence()?;
        if entry.sequence != expected {
            return Err(StoreError::Corruption(format!(
                "audit append out of order: expected sequence {expected}, got {}",
                entry.sequence
            )));
        }
        let bytes = bincode::serialize(entry).map_err(LmdbError::from)?;
        self.env
            .audit_db
            .put(&mut self.txn, &entry.key(), &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_poll(&self, question_id: &str) -> Result<Option<Poll>, StoreError> {
        let val = self
            .env
            .polls_db
            .get(&self.txn, question_id.as_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn set_poll_active(&mut self, question_id: &str, active: bool) -> Result<Poll, StoreError> {
        let mut poll = self
            .get_poll(question_id)?
            .ok_or_else(|| StoreError::NotFound(format!("poll '{question_id}'")))?;
        poll.active = active;
        let bytes = bincode::serialize(&poll).map_err(LmdbError::from)?;
        self.env
            .polls_db
            .put(&mut self.txn, question_id.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        Ok(poll)
    }

    fn insert_poll(&mut self, poll: &Poll) -> Result<(), StoreError> {
        let key = poll.question_id.as_bytes();
        let existing = self
            .env
            .polls_db
            .get(&self.txn, key)
            .map_err(LmdbError::from)?;
        if existing.is_some() {
            return Err(StoreError::Duplicate(format!("poll '{}'", poll.question_id)));
        }
        let bytes = bincode::serialize(poll).map_err(LmdbError::from)?;
        self.env
            .polls_db
            .put(&mut self.txn, key, &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    /// Commit all batched operations in a single write transaction.
    ///
    /// This is the only fsync in the entire batch.
    fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

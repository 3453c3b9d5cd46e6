//! Nullable store: thread-safe in-memory ledger storage for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tally_store::{
    AuditStore, LedgerBatch, LedgerStore, PollStore, StoreError, VoteStore,
};
use tally_types::{AuditEntry, Poll, Vote, VoteId};

#[derive(Default)]
struct Ledger {
    votes: Vec<Vote>,
    index: HashMap<(String, String), VoteId>,
    audit: Vec<AuditEntry>,
    polls: HashMap<String, Poll>,
}

/// An in-memory ledger store for testing.
///
/// The whole ledger sits behind one mutex. A [`NullBatch`] holds the lock
/// for its entire lifetime, which serializes writers the way an LMDB write
/// transaction does. Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullLedgerStore {
    ledger: Mutex<Ledger>,
    fail_next_commit: AtomicBool,
}

impl NullLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next [`LedgerBatch::commit`] fail with a backend error and
    /// discard the batch.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Rewrite a stored audit entry in place, bypassing every check.
    /// Returns `false` if no entry has that sequence number.
    pub fn tamper_audit(&self, sequence: u64, edit: impl FnOnce(&mut AuditEntry)) -> bool {
        let Ok(mut ledger) = self.ledger.lock() else {
            return false;
        };
        match ledger.audit.iter_mut().find(|e| e.sequence == sequence) {
            Some(entry) => {
                edit(entry);
                true
            }
            None => false,
        }
    }

    /// Remove a stored audit entry, bypassing every check.
    pub fn remove_audit(&self, sequence: u64) -> Option<AuditEntry> {
        let mut ledger = self.ledger.lock().ok()?;
        let pos = ledger.audit.iter().position(|e| e.sequence == sequence)?;
        Some(ledger.audit.remove(pos))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Ledger>, StoreError> {
        self.ledger
            .lock()
            .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
    }
}

impl VoteStore for NullLedgerStore {
    fn get_vote(&self, id: VoteId) -> Result<Option<Vote>, StoreError> {
        Ok(self.lock()?.votes.get(id.as_u64() as usize).cloned())
    }

    fn has_voted(&self, question_id: &str, voter_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .lock()?
            .index
            .contains_key(&(question_id.to_string(), voter_id.to_string())))
    }

    fn votes_for_question(&self, question_id: &str) -> Result<Vec<Vote>, StoreError> {
        Ok(self
            .lock()?
            .votes
            .iter()
            .filter(|v| v.question_id == question_id)
            .cloned()
            .collect())
    }

    fn vote_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.votes.len() as u64)
    }
}

impl AuditStore for NullLedgerStore {
    fn latest_audit(&self) -> Result<Option<AuditEntry>, StoreError> {
        Ok(self.lock()?.audit.last().cloned())
    }

    fn audit_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.audit.len() as u64)
    }

    fn audit_range(&self, start: u64, limit: usize) -> Result<Vec<AuditEntry>, StoreError> {
        Ok(self
            .lock()?
            .audit
            .iter()
            .filter(|e| e.sequence >= start)
            .take(limit)
            .cloned()
            .collect())
    }
}

impl PollStore for NullLedgerStore {
    fn get_poll(&self, question_id: &str) -> Result<Option<Poll>, StoreError> {
        Ok(self.lock()?.polls.get(question_id).cloned())
    }

    fn active_polls(&self) -> Result<Vec<Poll>, StoreError> {
        Ok(self
            .lock()?
            .polls
            .values()
            .filter(|p| p.active)
            .cloned()
            .collect())
    }

    fn poll_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.polls.len() as u64)
    }
}

impl LedgerStore for NullLedgerStore {
    type Batch<'a> = NullBatch<'a>;

    fn write_batch(&self) -> Result<NullBatch<'_>, StoreError> {
        Ok(NullBatch {
            ledger: self.lock()?,
            fail_commit: &self.fail_next_commit,
            votes: Vec::new(),
            audit: Vec::new(),
            polls: Vec::new(),
        })
    }
}

/// Staged writes over a locked [`NullLedgerStore`].
pub struct NullBatch<'a> {
    ledger: MutexGuard<'a, Ledger>,
    fail_commit: &'a AtomicBool,
    votes: Vec<Vote>,
    audit: Vec<AuditEntry>,
    polls: Vec<Poll>,
}

impl NullBatch<'_> {
    fn staged_vote_exists(&self, question_id: &str, voter_id: &str) -> bool {
        self.votes
            .iter()
            .any(|v| v.question_id == question_id && v.voter_id == voter_id)
    }
}

impl LedgerBatch for NullBatch<'_> {
    fn latest_audit(&self) -> Result<Option<AuditEntry>, StoreError> {
        Ok(self
            .audit
            .last()
            .or_else(|| self.ledger.audit.last())
            .cloned())
    }

    fn insert_vote(&mut self, vote: &Vote) -> Result<VoteId, StoreError> {
        let key = (vote.question_id.clone(), vote.voter_id.clone());
        if self.ledger.index.contains_key(&key)
            || self.staged_vote_exists(&vote.question_id, &vote.voter_id)
        {
            return Err(StoreError::Duplicate(format!(
                "vote for question '{}'",
                vote.question_id
            )));
        }
        let id = VoteId::new((self.ledger.votes.len() + self.votes.len()) as u64);
        self.votes.push(vote.clone());
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
        self.audit.push(entry.clone());
        Ok(())
    }

    fn get_poll(&self, question_id: &str) -> Result<Option<Poll>, StoreError> {
        Ok(self
            .polls
            .iter()
            .rev()
            .find(|p| p.question_id == question_id)
            .or_else(|| self.ledger.polls.get(question_id))
            .cloned())
    }

    fn set_poll_active(&mut self, question_id: &str, active: bool) -> Result<Poll, StoreError> {
        let mut poll = self
            .get_poll(question_id)?
            .ok_or_else(|| StoreError::NotFound(format!("poll '{question_id}'")))?;
        poll.active = active;
        self.polls.push(poll.clone());
        Ok(poll)
    }

    fn insert_poll(&mut self, poll: &Poll) -> Result<(), StoreError> {
        if self.ledger.polls.contains_key(&poll.question_id)
            || self.polls.iter().any(|p| p.question_id == poll.question_id)
        {
            return Err(StoreError::Duplicate(format!("poll '{}'", poll.question_id)));
        }
        self.polls.push(poll.clone());
        Ok(())
    }

    fn commit(mut self) -> Result<(), StoreError> {
        if self.fail_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".into()));
        }
        for vote in std::mem::take(&mut self.votes) {
            let id = VoteId::new(self.ledger.votes.len() as u64);
            self.ledger
                .index
                .insert((vote.question_id.clone(), vote.voter_id.clone()), id);
            self.ledger.votes.push(vote);
        }
        let audit = std::mem::take(&mut self.audit);
        self.ledger.audit.extend(audit);
        for poll in std::mem::take(&mut self.polls) {
            self.ledger.polls.insert(poll.question_id.clone(), poll);
        }
        Ok(())
    }
}

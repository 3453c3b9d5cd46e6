//! The vote ledger service object.

use std::time::Instant;

use tally_crypto::{chain_digest, poll_id_digest, AuditSalt};
use tally_store::{LedgerBatch, LedgerStore, StoreError};
use tally_types::{AuditEntry, AuditHash, AuditPayload, Ballot, Poll, Timestamp, Vote};
use tracing::{debug, error, info, warn};

use crate::chain::{self, ChainReport};
use crate::results::{tally, PollResults};
use crate::validate::{self, PollDraft};
use crate::{LedgerConfig, LedgerError};

/// Counts and head of the ledger, for operators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerSummary {
    pub votes: u64,
    pub audit_entries: u64,
    pub polls: u64,
    pub head_hash: Option<AuditHash>,
}

/// One page of the audit chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditPage {
    pub entries: Vec<AuditEntry>,
    /// Sequence number to resume from; `None` once the chain is exhausted.
    pub next_cursor: Option<u64>,
}

/// Accepts votes, keeps the audit chain, and serves aggregate results.
///
/// All mutation goes through one [`LedgerStore::write_batch`] per call, so
/// concurrent callers are serialized by the store. Methods block; async
/// callers should run them on a blocking thread.
pub struct VoteLedger<S> {
    store: S,
    salt: AuditSalt,
    config: LedgerConfig,
}

impl<S: LedgerStore> VoteLedger<S> {
    pub fn new(store: S, salt: AuditSalt) -> Self {
        Self::with_config(store, salt, LedgerConfig::default())
    }

    pub fn with_config(store: S, salt: AuditSalt, config: LedgerConfig) -> Self {
        Self {
            store,
            salt,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Record a vote and return the hash of its audit entry.
    ///
    /// Fails after [`LedgerConfig::submit_timeout`], lock wait included.
    pub fn submit_vote(&self, ballot: &Ballot) -> Result<AuditHash, LedgerError> {
        self.submit_vote_before(ballot, Instant::now() + self.config.submit_timeout)
    }

    /// Record a vote, giving up if `deadline` passes before the commit.
    ///
    /// The vote and its audit entry are committed together or not at all.
    pub fn submit_vote_before(
        &self,
        ballot: &Ballot,
        deadline: Instant,
    ) -> Result<AuditHash, LedgerError> {
        let started = Instant::now();
        let ballot = validate::clean_ballot(ballot).inspect_err(|e| {
            warn!(error = %e, "vote rejected");
        })?;

        let mut batch = self.store.write_batch()?;
        check_deadline(started, deadline)?;

        if let Some(poll) = batch.get_poll(&ballot.question_id)? {
            if !poll.active {
                warn!(question_id = %ballot.question_id, "vote rejected: poll is closed");
                return Err(LedgerError::Validation(format!(
                    "poll {} is closed",
                    ballot.question_id
                )));
            }
            if !poll.has_option(&ballot.choice) {
                warn!(question_id = %ballot.question_id, "vote rejected: choice is not a poll option");
                return Err(LedgerError::Validation(format!(
                    "'{}' is not an option of poll {}",
                    ballot.choice, ballot.question_id
                )));
            }
        }

        let latest = batch.latest_audit()?;
        let previous_hash = latest.as_ref().map(|e| e.hash);
        let sequence = latest.as_ref().map_or(0, |e| e.sequence + 1);

        let now = Timestamp::now();
        let vote = Vote {
            question_id: ballot.question_id,
            choice: ballot.choice,
            voter_id: ballot.voter_id,
            created_at: now,
        };
        let payload = AuditPayload::new(&vote, now).to_json()?;
        let previous_hex = previous_hash.map(|h| h.to_hex()).unwrap_or_default();
        let hash = chain_digest(&previous_hex, &payload, self.salt.as_bytes());

        let vote_id = match batch.insert_vote(&vote) {
            Ok(id) => id,
            Err(StoreError::Duplicate(_)) => {
                warn!(question_id = %vote.question_id, "vote rejected: duplicate");
                return Err(LedgerError::DuplicateVote {
                    question_id: vote.question_id,
                });
            }
            Err(e) => return Err(e.into()),
        };

        batch.append_audit(&AuditEntry {
            sequence,
            vote_reference: vote_id,
            payload,
            previous_hash,
            hash,
            created_at: now,
        })?;

        check_deadline(started, deadline)?;
        batch.commit().inspect_err(|e| {
            error!(error = %e, "vote commit failed");
        })?;

        info!(
            question_id = %vote.question_id,
            sequence,
            audit_hash = %hash,
            "vote accepted"
        );
        Ok(hash)
    }

    /// Check every link of the audit chain.
    pub fn verify_chain(&self) -> Result<ChainReport, LedgerError> {
        let report = chain::verify_chain(&self.store, &self.salt).inspect_err(|e| {
            error!(error = %e, "audit chain verification failed");
        })?;
        debug!(entries = report.entries, "audit chain verified");
        Ok(report)
    }

    /// Disclosed per-choice totals for a question.
    pub fn results(&self, question_id: &str) -> Result<PollResults, LedgerError> {
        let question_id = validate::clean_question_id(question_id)?;
        let votes = self.store.votes_for_question(&question_id)?;
        let results = tally(&votes, self.config.disclosure_threshold);
        Ok(PollResults {
            question_id,
            results,
        })
    }

    /// Register a poll and return it with its final question id.
    pub fn create_poll(&self, draft: &PollDraft) -> Result<Poll, LedgerError> {
        let clean = validate::clean_poll(draft)?;
        let created_at = Timestamp::now();
        let question_id = match clean.question_id {
            Some(id) => id,
            None => poll_id_digest(&clean.question, &clean.options, created_at.as_millis()),
        };
        let poll = Poll {
            question_id,
            question: clean.question,
            options: clean.options,
            created_at,
            active: true,
        };

        let mut batch = self.store.write_batch()?;
        match batch.insert_poll(&poll) {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                return Err(LedgerError::DuplicatePoll(poll.question_id));
            }
            Err(e) => return Err(e.into()),
        }
        batch.commit()?;

        info!(question_id = %poll.question_id, options = poll.options.len(), "poll created");
        Ok(poll)
    }

    pub fn get_poll(&self, question_id: &str) -> Result<Poll, LedgerError> {
        let question_id = validate::clean_question_id(question_id)?;
        self.store
            .get_poll(&question_id)?
            .ok_or_else(|| LedgerError::NotFound(format!("poll {question_id}")))
    }

    /// Polls open for voting, oldest first.
    pub fn active_polls(&self) -> Result<Vec<Poll>, LedgerError> {
        let mut polls = self.store.active_polls()?;
        polls.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.question_id.cmp(&b.question_id))
        });
        Ok(polls)
    }

    /// Open or close a registered poll. Closed polls refuse new votes but
    /// keep their results.
    pub fn set_poll_active(&self, question_id: &str, active: bool) -> Result<Poll, LedgerError> {
        let question_id = validate::clean_question_id(question_id)?;
        let mut batch = self.store.write_batch()?;
        let poll = match batch.set_poll_active(&question_id, active) {
            Ok(poll) => poll,
            Err(StoreError::NotFound(_)) => {
                return Err(LedgerError::NotFound(format!("poll {question_id}")));
            }
            Err(e) => return Err(e.into()),
        };
        batch.commit()?;

        info!(question_id = %poll.question_id, active, "poll status changed");
        Ok(poll)
    }

    /// Up to `count` audit entries starting at sequence `cursor`.
    pub fn audit_page(&self, cursor: u64, count: usize) -> Result<AuditPage, LedgerError> {
        let mut entries = self.store.audit_range(cursor, count.saturating_add(1))?;
        let next_cursor = if entries.len() > count {
            entries.pop().map(|e| e.sequence)
        } else {
            None
        };
        Ok(AuditPage {
            entries,
            next_cursor,
        })
    }

    pub fn summary(&self) -> Result<LedgerSummary, LedgerError> {
        Ok(LedgerSummary {
            votes: self.store.vote_count()?,
            audit_entries: self.store.audit_count()?,
            polls: self.store.poll_count()?,
            head_hash: self.store.latest_audit()?.map(|e| e.hash),
        })
    }
}

fn check_deadline(started: Instant, deadline: Instant) -> Result<(), StoreError> {
    if Instant::now() >= deadline {
        warn!("vote submission timed out, rolling back");
        return Err(StoreError::Timeout(deadline.saturating_duration_since(started)));
    }
    Ok(())
}

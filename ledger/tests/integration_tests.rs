//! Integration tests running the vote ledger on a real LMDB environment:
//! concurrent submission → single write transaction → chain verification →
//! reopen from disk.

use std::sync::Arc;
use std::thread;

use tally_crypto::AuditSalt;
use tally_ledger::{LedgerError, PollDraft, VoteLedger};
use tally_store::{AuditStore, VoteStore};
use tally_store_lmdb::{check_integrity, LmdbEnvironment};
use tally_types::Ballot;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn salt() -> AuditSalt {
    AuditSalt::new("integration-salt").expect("non-empty salt")
}

fn temp_ledger() -> (tempfile::TempDir, VoteLedger<LmdbEnvironment>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let env = LmdbEnvironment::open(dir.path(), 8, 64 * 1024 * 1024).expect("open env");
    (dir, VoteLedger::new(env, salt()))
}

// ---------------------------------------------------------------------------
// 1. Concurrent submissions form one unbroken chain
// ---------------------------------------------------------------------------

#[test]
fn concurrent_submits_form_a_single_chain() {
    let (_dir, ledger) = temp_ledger();
    let ledger = Arc::new(ledger);
    let threads = 8;
    let per_thread = 25;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let ballot = Ballot::new("q-load", "A", format!("voter-{t}-{i}"));
                    ledger.submit_vote(&ballot).expect("distinct voters are accepted");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread");
    }

    let n = (threads * per_thread) as u64;
    let report = ledger.verify_chain().expect("chain intact");
    assert_eq!(report.entries, n);
    assert_eq!(ledger.store().audit_count().unwrap(), n);
    assert_eq!(ledger.store().vote_count().unwrap(), n);

    let entries = ledger.store().audit_entries().unwrap();
    for pair in entries.windows(2) {
        assert_eq!(pair[1].previous_hash, Some(pair[0].hash));
    }
}

// ---------------------------------------------------------------------------
// 2. Racing duplicates: exactly one wins
// ---------------------------------------------------------------------------

#[test]
fn concurrent_duplicates_accept_exactly_one() {
    let (_dir, ledger) = temp_ledger();
    let ledger = Arc::new(ledger);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let choice = if i % 2 == 0 { "A" } else { "B" };
                ledger.submit_vote(&Ballot::new("q1", choice, "same-voter"))
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("worker thread"))
        .collect();
    let accepted = outcomes.iter().filter(|r| r.is_ok()).count();
    let duplicates = outcomes
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::DuplicateVote { .. })))
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(ledger.store().vote_count().unwrap(), 1);
    assert_eq!(ledger.verify_chain().unwrap().entries, 1);
}

// ---------------------------------------------------------------------------
// 3. Persistence across reopen
// ---------------------------------------------------------------------------

#[test]
fn ledger_survives_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let head = {
        let env = LmdbEnvironment::open(dir.path(), 8, 64 * 1024 * 1024).expect("open env");
        let ledger = VoteLedger::new(env, salt());
        ledger
            .create_poll(&PollDraft::new("Weather?", ["Sunny", "Rain"]).with_question_id("weather"))
            .unwrap();
        for i in 0..12 {
            ledger
                .submit_vote(&Ballot::new("weather", "Sunny", format!("v{i}")))
                .unwrap();
        }
        ledger.summary().unwrap().head_hash
    };

    let env = LmdbEnvironment::open(dir.path(), 8, 64 * 1024 * 1024).expect("reopen env");
    let report = check_integrity(&env).expect("integrity check");
    assert!(report.is_healthy(), "errors: {:?}", report.errors);

    let ledger = VoteLedger::new(env, salt());
    let chain = ledger.verify_chain().unwrap();
    assert_eq!(chain.entries, 12);
    assert_eq!(chain.head_hash, head);

    let results = ledger.results("weather").unwrap();
    assert_eq!(results.results.len(), 1);
    assert_eq!(results.results[0].total, 12);

    // Still one vote per voter after reopening.
    assert!(matches!(
        ledger.submit_vote(&Ballot::new("weather", "Rain", "v0")),
        Err(LedgerError::DuplicateVote { .. })
    ));
}

// ---------------------------------------------------------------------------
// 4. A different salt cannot verify the chain
// ---------------------------------------------------------------------------

#[test]
fn wrong_salt_fails_verification_at_first_entry() {
    let dir = tempfile::tempdir().expect("temp dir");
    {
        let env = LmdbEnvironment::open(dir.path(), 8, 64 * 1024 * 1024).expect("open env");
        let ledger = VoteLedger::new(env, salt());
        ledger.submit_vote(&Ballot::new("q1", "A", "v1")).unwrap();
        ledger.submit_vote(&Ballot::new("q1", "A", "v2")).unwrap();
    }

    let env = LmdbEnvironment::open(dir.path(), 8, 64 * 1024 * 1024).expect("reopen env");
    let ledger = VoteLedger::new(env, AuditSalt::new("other-salt").unwrap());
    match ledger.verify_chain() {
        Err(LedgerError::Integrity { sequence, .. }) => assert_eq!(sequence, 0),
        other => panic!("expected integrity failure, got {other:?}"),
    }
}

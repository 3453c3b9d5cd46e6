//! Domain types for the tally vote ledger.
//!
//! This crate defines the records shared across every other crate in the
//! workspace: votes, audit entries, registered polls, the audit hash and
//! timestamps. It has no storage or HTTP knowledge.

pub mod audit;
pub mod error;
pub mod hash;
pub mod poll;
pub mod time;
pub mod vote;

pub use audit::{AuditEntry, AuditPayload};
pub use error::TypesError;
pub use hash::AuditHash;
pub use poll::Poll;
pub use time::Timestamp;
pub use vote::{Ballot, Vote, VoteId};

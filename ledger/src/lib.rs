//! The vote ledger.
//!
//! Every accepted vote is stored together with an audit entry whose hash
//! covers the previous entry's hash, the vote snapshot and a server-side
//! salt. Both writes go through one store write batch, so the chain never
//! forks and a vote never exists without its audit entry.
//!
//! Aggregate results are threshold-suppressed: a choice is only disclosed
//! once enough voters picked it.

pub mod chain;
pub mod config;
pub mod error;
pub mod ledger;
pub mod results;
pub mod validate;

pub use chain::{verify_chain, ChainBreak, ChainReport};
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use ledger::{AuditPage, LedgerSummary, VoteLedger};
pub use results::{tally, ChoiceTotal, PollResults};
pub use validate::{PollDraft, MAX_CHOICE_LEN, MAX_ID_LEN, MAX_OPTIONS, MAX_QUESTION_LEN};

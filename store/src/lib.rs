//! Abstract storage traits for the tally vote ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.
//!
//! Reads go through [`VoteStore`], [`AuditStore`] and [`PollStore`]. All
//! mutation goes through a [`LedgerBatch`] obtained from
//! [`LedgerStore::write_batch`]: a scoped write transaction that is the
//! single serialization point of the ledger. At most one batch is open at a
//! time, so "read the latest audit hash, then append" cannot interleave with
//! another append. A batch dropped without [`LedgerBatch::commit`] rolls
//! back every staged write.

pub mod audit;
pub mod batch;
pub mod error;
pub mod poll;
pub mod vote;

pub use audit::AuditStore;
pub use batch::{LedgerBatch, LedgerStore};
pub use error::StoreError;
pub use poll::PollStore;
pub use vote::VoteStore;

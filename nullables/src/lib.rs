//! Nullable infrastructure for deterministic testing.
//!
//! Storage is abstracted behind the `tally-store` traits. This crate
//! provides a test-friendly implementation that:
//! - Never touches the filesystem
//! - Has the same transactional semantics as the LMDB backend (one open
//!   batch at a time, rollback on drop)
//! - Can be told to fail or tampered with programmatically
//!
//! Usage: swap the LMDB environment for [`NullLedgerStore`] in tests.

pub mod store;

pub use store::{NullBatch, NullLedgerStore};

//! LMDB storage backend for the tally vote ledger.
//!
//! Implements all storage traits from `tally-store` using the `heed` LMDB
//! bindings. Each logical store maps to one LMDB database within a single
//! environment:
//!
//! | database     | key                                  | value              |
//! |--------------|--------------------------------------|--------------------|
//! | `votes`      | vote id (u64 BE)                     | bincode `Vote`     |
//! | `vote_index` | `len(question) ++ question ++ voter` | vote id (u64 BE)   |
//! | `audit`      | sequence (u64 BE)                    | bincode `AuditEntry` |
//! | `polls`      | question id                          | bincode `Poll`     |
//! | `meta`       | name                                 | raw bytes          |
//!
//! `vote_index` is the uniqueness constraint for `(voter, question)`. LMDB
//! admits a single write transaction at a time, which is what serializes
//! audit appends.

pub mod audit;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod keys;
pub mod meta;
pub mod poll;
pub mod schema;
pub mod vote;
pub mod write_batch;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use schema::{check_schema, SCHEMA_VERSION};
pub use write_batch::WriteBatch;

//! Cryptographic primitives for the tally vote ledger.
//!
//! - **SHA-256** for the audit hash chain and generated poll ids
//! - **HMAC-SHA256** for constant-time shared-secret checks
//! - Zeroize-on-drop holders for the audit salt and admin key

pub mod hash;
pub mod secret;

pub use hash::{chain_digest, poll_id_digest, sha256, sha256_multi};
pub use secret::{AuditSalt, SharedSecret};

//! Audit chain verification.

use std::fmt;

use tally_crypto::{chain_digest, AuditSalt};
use tally_store::AuditStore;
use tally_types::AuditHash;

use crate::LedgerError;

/// Entries fetched per read while walking the chain.
const VERIFY_PAGE: usize = 1024;

/// Why a chain walk stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainBreak {
    /// The entry's sequence number is not one past its predecessor's.
    SequenceGap { expected: u64 },
    /// `previous_hash` does not name the preceding entry's hash.
    PreviousMismatch,
    /// Recomputing the digest does not reproduce the stored hash.
    HashMismatch,
}

impl fmt::Display for ChainBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainBreak::SequenceGap { expected } => {
                write!(f, "sequence gap (expected entry {expected})")
            }
            ChainBreak::PreviousMismatch => f.write_str("previous hash does not match predecessor"),
            ChainBreak::HashMismatch => f.write_str("stored hash does not match recomputed digest"),
        }
    }
}

/// Outcome of a successful verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainReport {
    pub entries: u64,
    /// Hash of the last entry; `None` for an empty ledger.
    pub head_hash: Option<AuditHash>,
}

/// Walk every audit entry in sequence order and check each link.
///
/// Stops at the first broken entry. Read-only.
pub fn verify_chain<S: AuditStore + ?Sized>(
    store: &S,
    salt: &AuditSalt,
) -> Result<ChainReport, LedgerError> {
    let mut previous: Option<AuditHash> = None;
    let mut expected: u64 = 0;

    loop {
        let page = store.audit_range(expected, VERIFY_PAGE)?;
        let fetched = page.len();

        for entry in page {
            let broken = |reason| LedgerError::Integrity {
                sequence: entry.sequence,
                reason,
            };
            if entry.sequence != expected {
                return Err(broken(ChainBreak::SequenceGap { expected }));
            }
            if entry.previous_hash != previous {
                return Err(broken(ChainBreak::PreviousMismatch));
            }
            let digest = chain_digest(&entry.previous_hex(), &entry.payload, salt.as_bytes());
            if digest != entry.hash {
                return Err(broken(ChainBreak::HashMismatch));
            }
            previous = Some(entry.hash);
            expected += 1;
        }

        if fetched < VERIFY_PAGE {
            break;
        }
    }

    Ok(ChainReport {
        entries: expected,
        head_hash: previous,
    })
}

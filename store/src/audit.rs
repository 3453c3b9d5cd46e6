//! Audit chain storage trait (read side).

use crate::StoreError;
use tally_types::AuditEntry;

/// Read access to the audit chain.
pub trait AuditStore {
    /// The most recently appended entry, or `None` for an empty ledger.
    fn latest_audit(&self) -> Result<Option<AuditEntry>, StoreError>;

    /// Number of entries in the chain.
    fn audit_count(&self) -> Result<u64, StoreError>;

    /// Up to `limit` entries starting at sequence `start`, in order.
    fn audit_range(&self, start: u64, limit: usize) -> Result<Vec<AuditEntry>, StoreError>;

    /// Every entry in sequence order.
    fn audit_entries(&self) -> Result<Vec<AuditEntry>, StoreError> {
        self.audit_range(0, usize::MAX)
    }
}

//! LMDB implementation of AuditStore.

use std::ops::Bound;

use tally_store::{AuditStore, StoreError};
use tally_types::AuditEntry;

use crate::{LmdbEnvironment, LmdbError};

impl AuditStore for LmdbEnvironment {
    fn latest_audit(&self) -> Result<Option<AuditEntry>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let last = self.audit_db.last(&rtxn).map_err(LmdbError::from)?;
        match last {
            Some((_, val)) => {
                let entry: AuditEntry = bincode::deserialize(val).map_err(LmdbError::from)?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    fn audit_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let count = self.audit_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }

    fn audit_range(&self, start: u64, limit: usize) -> Result<Vec<AuditEntry>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let start_key = start.to_be_bytes();
        let bounds = (Bound::Included(&start_key[..]), Bound::Unbounded);
        let iter = self
            .audit_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;

        let mut entries = Vec::new();
        for result in iter.take(limit) {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let entry: AuditEntry = bincode::deserialize(val).map_err(LmdbError::from)?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::LedgerBatch;
    use tally_types::{AuditHash, Timestamp, VoteId};

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = LmdbEnvironment::open(dir.path(), 8, 10 * 1024 * 1024).expect("open env");
        (dir, env)
    }

    fn append(env: &LmdbEnvironment, count: u64) {
        let mut batch = env.write_batch().expect("write_batch");
        for sequence in 0..count {
            batch
                .append_audit(&AuditEntry {
                    sequence,
                    vote_reference: VoteId::new(sequence),
                    payload: "{}".into(),
                    previous_hash: None,
                    hash: AuditHash::new([sequence as u8; 32]),
                    created_at: Timestamp::from_millis(sequence),
                })
                .expect("append");
        }
        batch.commit().expect("commit");
    }

    #[test]
    fn range_pages_in_sequence_order() {
        let (_dir, env) = temp_env();
        append(&env, 300);

        let page = env.audit_range(250, 10).expect("range");
        let seqs: Vec<u64> = page.iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, (250..260).collect::<Vec<_>>());
    }

    #[test]
    fn range_past_end_is_empty() {
        let (_dir, env) = temp_env();
        append(&env, 3);
        assert!(env.audit_range(3, 10).expect("range").is_empty());
    }

    #[test]
    fn entries_and_latest_agree() {
        let (_dir, env) = temp_env();
        append(&env, 5);
        let all = env.audit_entries().expect("entries");
        assert_eq!(all.len(), 5);
        assert_eq!(env.audit_count().expect("count"), 5);
        assert_eq!(env.latest_audit().expect("latest"), all.last().cloned());
    }
}

//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use tally_store::{LedgerStore, StoreError};

use crate::write_batch::WriteBatch;
use crate::LmdbError;

/// Number of named databases the environment is opened with.
pub const DEFAULT_MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Env,
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) vote_index_db: Database<Bytes, Bytes>,
    pub(crate) audit_db: Database<Bytes, Bytes>,
    pub(crate) polls_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// Creates the directory and every database on first use, then checks
    /// the schema version.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        let mut options = EnvOpenOptions::new();
        options.map_size(map_size).max_dbs(max_dbs);
        // SAFETY: the environment directory is owned by this process; no other
        // handle to the same path is opened while this one is alive.
        let env = unsafe { options.open(path) }?;

        let mut wtxn = env.write_txn()?;
        let votes_db = env.create_database(&mut wtxn, Some("votes"))?;
        let vote_index_db = env.create_database(&mut wtxn, Some("vote_index"))?;
        let audit_db = env.create_database(&mut wtxn, Some("audit"))?;
        let polls_db = env.create_database(&mut wtxn, Some("polls"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        let environment = Self {
            env,
            votes_db,
            vote_index_db,
            audit_db,
            polls_db,
            meta_db,
        };
        crate::check_schema(&environment)?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(environment)
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Begin a write batch. Blocks while another write transaction is open.
    pub fn write_batch(&self) -> Result<WriteBatch<'_>, StoreError> {
        WriteBatch::new(self)
    }
}

impl LedgerStore for LmdbEnvironment {
    type Batch<'a> = WriteBatch<'a>;

    fn write_batch(&self) -> Result<WriteBatch<'_>, StoreError> {
        WriteBatch::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_directory() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("nested").join("pollsDB");
        let _env = LmdbEnvironment::open(&path, DEFAULT_MAX_DBS, 10 * 1024 * 1024)
            .expect("failed to open env");
        assert!(path.join("data.mdb").exists());
    }

    #[test]
    fn reopen_keeps_data() {
        use tally_store::{LedgerBatch, VoteStore};
        use tally_types::{Timestamp, Vote};

        let dir = tempfile::tempdir().expect("failed to create temp dir");
        {
            let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAX_DBS, 10 * 1024 * 1024)
                .expect("open");
            let mut batch = env.write_batch().expect("write_batch");
            batch
                .insert_vote(&Vote {
                    question_id: "q1".into(),
                    choice: "A".into(),
                    voter_id: "v1".into(),
                    created_at: Timestamp::from_millis(1),
                })
                .expect("insert_vote");
            batch.commit().expect("commit");
        }
        let env =
            LmdbEnvironment::open(dir.path(), DEFAULT_MAX_DBS, 10 * 1024 * 1024).expect("reopen");
        assert_eq!(env.vote_count().expect("count"), 1);
        assert!(env.has_voted("q1", "v1").expect("has_voted"));
    }
}

//! LMDB database integrity checks.
//!
//! Run on startup to detect corruption early, before the server begins
//! accepting votes. This is a structural check (databases readable, counts
//! consistent); the audit hash chain itself is verified by the ledger.

use std::path::Path;

use heed::types::Bytes;

use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub vote_count: u64,
    pub vote_index_count: u64,
    pub audit_count: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Database names that we expect to exist in a valid tally LMDB environment.
const EXPECTED_DATABASES: &[&str] = &["votes", "vote_index", "audit", "polls", "meta"];

/// Check LMDB database integrity on startup.
///
/// Opens each expected database and counts entries. Every vote must have
/// exactly one index entry and exactly one audit entry, so the three counts
/// must agree. Read failures are recorded in the report rather than causing
/// a hard error.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();

    let rtxn = env.env().read_txn()?;

    for &db_name in EXPECTED_DATABASES {
        match env
            .env()
            .open_database::<Bytes, Bytes>(&rtxn, Some(db_name))
        {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) => {
                        report.total_entries += count;
                        match db_name {
                            "votes" => report.vote_count = count,
                            "vote_index" => report.vote_index_count = count,
                            "audit" => report.audit_count = count,
                            _ => {}
                        }
                    }
                    Err(e) => {
                        report
                            .errors
                            .push(format!("failed to read database '{}': {}", db_name, e));
                    }
                }
            }
            Ok(None) => {
                report
                    .errors
                    .push(format!("database '{}' is missing", db_name));
            }
            Err(e) => {
                report
                    .errors
                    .push(format!("failed to open database '{}': {}", db_name, e));
            }
        }
    }

    if report.vote_count != report.audit_count {
        report.errors.push(format!(
            "vote count {} does not match audit entry count {}",
            report.vote_count, report.audit_count
        ));
    }
    if report.vote_count != report.vote_index_count {
        report.errors.push(format!(
            "vote count {} does not match uniqueness index count {}",
            report.vote_count, report.vote_index_count
        ));
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing while other files are
/// present, which suggests corruption or a wrong path.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(()); // Fresh start
    }
    if !path.is_dir() {
        return Err(format!("{} exists but is not a directory", path.display()));
    }
    let data_file = path.join("data.mdb");
    let is_empty = path
        .read_dir()
        .map(|mut entries| entries.next().is_none())
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    if !data_file.exists() && !is_empty {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::LedgerBatch;
    use tally_types::{AuditEntry, AuditHash, Timestamp, Vote};

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = LmdbEnvironment::open(dir.path(), 8, 10 * 1024 * 1024).expect("open env");
        (dir, env)
    }

    fn vote(voter: &str) -> Vote {
        Vote {
            question_id: "q1".into(),
            choice: "A".into(),
            voter_id: voter.into(),
            created_at: Timestamp::from_millis(1),
        }
    }

    #[test]
    fn check_data_dir_fresh_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(check_data_dir(&dir.path().join("not-yet")).is_ok());
    }

    #[test]
    fn check_data_dir_empty_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(check_data_dir(dir.path()).is_ok());
    }

    #[test]
    fn check_data_dir_foreign_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("notes.txt"), b"hi").expect("write");
        assert!(check_data_dir(dir.path()).is_err());
    }

    #[test]
    fn fresh_environment_is_healthy() {
        let (_dir, env) = temp_env();
        let report = check_integrity(&env).expect("check");
        assert!(report.is_healthy(), "{:?}", report.errors);
        assert_eq!(report.databases_checked, 5);
    }

    #[test]
    fn complete_submission_is_healthy() {
        let (_dir, env) = temp_env();
        let mut batch = env.write_batch().expect("write_batch");
        let id = batch.insert_vote(&vote("v1")).expect("insert");
        batch
            .append_audit(&AuditEntry {
                sequence: 0,
                vote_reference: id,
                payload: "{}".into(),
                previous_hash: None,
                hash: AuditHash::new([1u8; 32]),
                created_at: Timestamp::from_millis(1),
            })
            .expect("append");
        batch.commit().expect("commit");

        let report = check_integrity(&env).expect("check");
        assert!(report.is_healthy(), "{:?}", report.errors);
        assert_eq!(report.vote_count, 1);
        assert_eq!(report.audit_count, 1);
    }

    #[test]
    fn vote_without_audit_entry_is_flagged() {
        let (_dir, env) = temp_env();
        let mut batch = env.write_batch().expect("write_batch");
        batch.insert_vote(&vote("v1")).expect("insert");
        batch.commit().expect("commit");

        let report = check_integrity(&env).expect("check");
        assert!(!report.is_healthy());
    }
}

//! Metadata stored alongside the ledger (schema version).

use crate::{LmdbEnvironment, LmdbError};

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

impl LmdbEnvironment {
    /// Get the current database schema version; 0 for a fresh database.
    pub fn get_schema_version(&self) -> Result<u32, LmdbError> {
        let rtxn = self.env().read_txn()?;
        let val = self.meta_db.get(&rtxn, SCHEMA_VERSION_KEY)?;
        match val {
            Some(bytes) => {
                let arr: [u8; 4] = bytes.try_into().map_err(|_| {
                    LmdbError::Serialization(
                        "schema_version has unexpected byte length".to_string(),
                    )
                })?;
                Ok(u32::from_le_bytes(arr))
            }
            None => Ok(0),
        }
    }

    /// Set the database schema version.
    pub fn set_schema_version(&self, version: u32) -> Result<(), LmdbError> {
        let bytes = version.to_le_bytes();
        let mut wtxn = self.env().write_txn()?;
        self.meta_db.put(&mut wtxn, SCHEMA_VERSION_KEY, &bytes)?;
        wtxn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::SCHEMA_VERSION;
    use crate::LmdbEnvironment;

    #[test]
    fn fresh_environment_is_stamped_with_current_version() {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = LmdbEnvironment::open(dir.path(), 8, 10 * 1024 * 1024).expect("open");
        assert_eq!(env.get_schema_version().expect("version"), SCHEMA_VERSION);
    }

    #[test]
    fn schema_version_roundtrip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = LmdbEnvironment::open(dir.path(), 8, 10 * 1024 * 1024).expect("open");
        env.set_schema_version(7).expect("set");
        assert_eq!(env.get_schema_version().expect("get"), 7);
    }
}

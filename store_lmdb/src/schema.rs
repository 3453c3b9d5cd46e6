//! On-disk schema version check.

use crate::{LmdbEnvironment, LmdbError};

/// Layout version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Stamp a fresh database with [`SCHEMA_VERSION`], or refuse one written
/// with any other layout.
pub fn check_schema(env: &LmdbEnvironment) -> Result<(), LmdbError> {
    match env.get_schema_version()? {
        0 => {
            env.set_schema_version(SCHEMA_VERSION)?;
            tracing::info!(version = SCHEMA_VERSION, "stamped new database");
            Ok(())
        }
        SCHEMA_VERSION => Ok(()),
        found => Err(LmdbError::Heed(format!(
            "database schema version {found} is not supported (expected {SCHEMA_VERSION})"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_schema_version_is_refused() {
        let dir = tempfile::tempdir().expect("temp dir");
        {
            let env = LmdbEnvironment::open(dir.path(), 8, 10 * 1024 * 1024).expect("open");
            env.set_schema_version(SCHEMA_VERSION + 1).expect("set");
        }
        assert!(LmdbEnvironment::open(dir.path(), 8, 10 * 1024 * 1024).is_err());
    }

    #[test]
    fn matching_version_reopens() {
        let dir = tempfile::tempdir().expect("temp dir");
        drop(LmdbEnvironment::open(dir.path(), 8, 10 * 1024 * 1024).expect("open"));
        let env = LmdbEnvironment::open(dir.path(), 8, 10 * 1024 * 1024).expect("reopen");
        assert_eq!(env.get_schema_version().expect("version"), SCHEMA_VERSION);
    }
}

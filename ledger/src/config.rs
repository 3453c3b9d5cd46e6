//! Ledger policy knobs.

use std::time::Duration;

/// Default minimum number of votes a choice needs before it is disclosed.
pub const DEFAULT_DISCLOSURE_THRESHOLD: u64 = 10;

/// Default upper bound on how long a submission may take, lock wait
/// included.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Choices with fewer votes than this are left out of results.
    pub disclosure_threshold: u64,
    /// Deadline applied by [`crate::VoteLedger::submit_vote`].
    pub submit_timeout: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            disclosure_threshold: DEFAULT_DISCLOSURE_THRESHOLD,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }
}

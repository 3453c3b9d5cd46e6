//! Poll registry storage trait (read side).

use crate::StoreError;
use tally_types::Poll;

pub trait PollStore {
    /// Get the registered poll for a question id.
    fn get_poll(&self, question_id: &str) -> Result<Option<Poll>, StoreError>;

    /// Every poll still open for voting, in no particular order.
    fn active_polls(&self) -> Result<Vec<Poll>, StoreError>;

    /// Number of registered polls.
    fn poll_count(&self) -> Result<u64, StoreError>;
}

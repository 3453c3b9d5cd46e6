//! Vote storage trait (read side).

use crate::StoreError;
use tally_types::{Vote, VoteId};

/// Read access to accepted votes.
pub trait VoteStore {
    /// Get a vote by its store-assigned id.
    fn get_vote(&self, id: VoteId) -> Result<Option<Vote>, StoreError>;

    /// Whether `voter_id` already has a vote recorded for `question_id`.
    fn has_voted(&self, question_id: &str, voter_id: &str) -> Result<bool, StoreError>;

    /// All votes recorded for a question, in acceptance order.
    fn votes_for_question(&self, question_id: &str) -> Result<Vec<Vote>, StoreError>;

    /// Total number of votes across all questions.
    fn vote_count(&self) -> Result<u64, StoreError>;
}

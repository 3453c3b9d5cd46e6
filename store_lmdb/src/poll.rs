//! LMDB implementation of PollStore.

use tally_store::{PollStore, StoreError};
use tally_types::Poll;

use crate::{LmdbEnvironment, LmdbError};

impl PollStore for LmdbEnvironment {
    fn get_poll(&self, question_id: &str) -> Result<Option<Poll>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let val = self
            .polls_db
            .get(&rtxn, question_id.as_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => {
                let poll: Poll = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(poll))
            }
            None => Ok(None),
        }
    }

    fn active_polls(&self) -> Result<Vec<Poll>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let iter = self.polls_db.iter(&rtxn).map_err(LmdbError::from)?;

        let mut polls = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let poll: Poll = bincode::deserialize(val).map_err(LmdbError::from)?;
            if poll.active {
                polls.push(poll);
            }
        }
        Ok(polls)
    }

    fn poll_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let count = self.polls_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}

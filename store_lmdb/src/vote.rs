//! LMDB implementation of VoteStore.

use std::ops::Bound;

use tally_store::{StoreError, VoteStore};
use tally_types::{Vote, VoteId};

use crate::keys::{decode_u64, increment_prefix, question_prefix, vote_index_key};
use crate::{LmdbEnvironment, LmdbError};

impl VoteStore for LmdbEnvironment {
    fn get_vote(&self, id: VoteId) -> Result<Option<Vote>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let val = self
            .votes_db
            .get(&rtxn, &id.to_key())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => {
                let vote: Vote = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(vote))
            }
            None => Ok(None),
        }
    }

    fn has_voted(&self, question_id: &str, voter_id: &str) -> Result<bool, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let key = vote_index_key(question_id, voter_id);
        let val = self
            .vote_index_db
            .get(&rtxn, &key)
            .map_err(LmdbError::from)?;
        Ok(val.is_some())
    }

    fn votes_for_question(&self, question_id: &str) -> Result<Vec<Vote>, StoreError> {
        let prefix = question_prefix(question_id);
        let mut upper = prefix.clone();
        let bounded = increment_prefix(&mut upper);

        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let upper_bound = if bounded {
            Bound::Excluded(upper.as_slice())
        } else {
            Bound::Unbounded
        };
        let bounds = (Bound::Included(prefix.as_slice()), upper_bound);
        let iter = self
            .vote_index_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;

        let mut ids = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let id = decode_u64(val)
                .ok_or_else(|| StoreError::Corruption("vote index value is not 8 bytes".into()))?;
            ids.push(id);
        }
        // Index order is by voter id; report in acceptance order.
        ids.sort_unstable();

        let mut votes = Vec::with_capacity(ids.len());
        for id in ids {
            let bytes = self
                .votes_db
                .get(&rtxn, &id.to_be_bytes())
                .map_err(LmdbError::from)?
                .ok_or_else(|| {
                    StoreError::Corruption(format!("vote index points at missing vote {id}"))
                })?;
            let vote: Vote = bincode::deserialize(bytes).map_err(LmdbError::from)?;
            votes.push(vote);
        }
        Ok(votes)
    }

    fn vote_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let count = self.votes_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::LedgerBatch;
    use tally_types::Timestamp;

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = LmdbEnvironment::open(dir.path(), 8, 10 * 1024 * 1024).expect("open env");
        (dir, env)
    }

    fn cast(env: &LmdbEnvironment, question: &str, voter: &str, choice: &str) {
        let mut batch = env.write_batch().expect("write_batch");
        batch
            .insert_vote(&Vote {
                question_id: question.into(),
                choice: choice.into(),
                voter_id: voter.into(),
                created_at: Timestamp::from_millis(1),
            })
            .expect("insert_vote");
        batch.commit().expect("commit");
    }

    #[test]
    fn votes_for_question_is_scoped_to_that_question() {
        let (_dir, env) = temp_env();
        cast(&env, "q1", "v2", "A");
        cast(&env, "q1", "v1", "B");
        cast(&env, "q10", "v1", "C");
        cast(&env, "q2", "v1", "D");

        let votes = env.votes_for_question("q1").expect("votes");
        let choices: Vec<&str> = votes.iter().map(|v| v.choice.as_str()).collect();
        assert_eq!(choices, vec!["A", "B"]);
    }

    #[test]
    fn unknown_question_has_no_votes() {
        let (_dir, env) = temp_env();
        cast(&env, "q1", "v1", "A");
        assert!(env.votes_for_question("nope").expect("votes").is_empty());
    }

    #[test]
    fn missing_vote_is_none() {
        let (_dir, env) = temp_env();
        assert!(env.get_vote(VoteId::new(42)).expect("get").is_none());
    }
}

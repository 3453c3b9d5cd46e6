//! Registered poll questions.

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// A poll question with its fixed option list.
///
/// Votes on a registered question must pick one of `options` and are refused
/// once the poll is deactivated; votes on an unregistered question id accept
/// any choice text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub question_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub created_at: Timestamp,
    /// Open for voting and listed to clients.
    pub active: bool,
}

impl Poll {
    pub fn has_option(&self, choice: &str) -> bool {
        self.options.iter().any(|o| o == choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_match_is_exact() {
        let poll = Poll {
            question_id: "q-mood".into(),
            question: "How do you feel?".into(),
            options: vec!["Sunny".into(), "Cloudy".into()],
            created_at: Timestamp::EPOCH,
            active: true,
        };
        assert!(poll.has_option("Sunny"));
        assert!(!poll.has_option("sunny"));
        assert!(!poll.has_option("Rain"));
    }
}

//! Input validation for ballots and poll registrations.
//!
//! All text fields are trimmed first; a field that is empty after trimming
//! counts as missing. Length limits are in bytes and keep every derived
//! LMDB key well under the 511-byte key limit.

use serde::Deserialize;

use tally_types::Ballot;

use crate::LedgerError;

/// Maximum length of a question id or voter id.
pub const MAX_ID_LEN: usize = 128;
/// Maximum length of a choice or poll option.
pub const MAX_CHOICE_LEN: usize = 256;
/// Maximum length of a poll's question text.
pub const MAX_QUESTION_LEN: usize = 1024;
/// Maximum number of options a poll may offer.
pub const MAX_OPTIONS: usize = 32;

/// Question ids that collide with fixed `/api/polls/...` routes.
const RESERVED_POLL_IDS: &[&str] = &["active"];

/// A ballot whose fields are present, trimmed and within limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CleanBallot {
    pub question_id: String,
    pub choice: String,
    pub voter_id: String,
}

/// A poll registration request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollDraft {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Caller-chosen id; generated from the content when absent.
    #[serde(default)]
    pub question_id: Option<String>,
}

impl PollDraft {
    pub fn new(question: impl Into<String>, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            question_id: None,
        }
    }

    pub fn with_question_id(mut self, question_id: impl Into<String>) -> Self {
        self.question_id = Some(question_id.into());
        self
    }
}

/// A poll draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CleanPoll {
    pub question: String,
    pub options: Vec<String>,
    pub question_id: Option<String>,
}

pub(crate) fn clean_ballot(ballot: &Ballot) -> Result<CleanBallot, LedgerError> {
    Ok(CleanBallot {
        question_id: required("questionId", ballot.question_id.as_deref(), MAX_ID_LEN)?,
        choice: required("choice", ballot.choice.as_deref(), MAX_CHOICE_LEN)?,
        voter_id: required("voterId", ballot.voter_id.as_deref(), MAX_ID_LEN)?,
    })
}

/// Validate a question id given on its own (results and poll lookups).
pub(crate) fn clean_question_id(question_id: &str) -> Result<String, LedgerError> {
    required("questionId", Some(question_id), MAX_ID_LEN)
}

pub(crate) fn clean_poll(draft: &PollDraft) -> Result<CleanPoll, LedgerError> {
    let question = required("question", Some(&draft.question), MAX_QUESTION_LEN)?;

    let mut options: Vec<String> = Vec::with_capacity(draft.options.len());
    for raw in &draft.options {
        let option = raw.trim();
        if option.is_empty() {
            continue;
        }
        if option.len() > MAX_CHOICE_LEN {
            return Err(LedgerError::validation(format!(
                "option exceeds {MAX_CHOICE_LEN} bytes"
            )));
        }
        if options.iter().any(|o| o == option) {
            return Err(LedgerError::validation(format!("duplicate option '{option}'")));
        }
        options.push(option.to_string());
    }
    if options.len() < 2 {
        return Err(LedgerError::validation("a poll needs at least 2 distinct options"));
    }
    if options.len() > MAX_OPTIONS {
        return Err(LedgerError::validation(format!(
            "a poll may have at most {MAX_OPTIONS} options"
        )));
    }

    let question_id = match draft.question_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(id) if RESERVED_POLL_IDS.contains(&id) => {
            return Err(LedgerError::validation(format!("questionId '{id}' is reserved")));
        }
        Some(id) => Some(clean_question_id(id)?),
    };

    Ok(CleanPoll {
        question,
        options,
        question_id,
    })
}

fn required(field: &str, value: Option<&str>, max_len: usize) -> Result<String, LedgerError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(LedgerError::validation(format!("{field} is required")));
    }
    if value.len() > max_len {
        return Err(LedgerError::validation(format!(
            "{field} exceeds {max_len} bytes"
        )));
    }
    Ok(value.to_string())
}

//! Threshold-suppressed aggregation.

use std::collections::HashMap;

use serde::Serialize;
use tally_types::Vote;

/// Number of votes for one disclosed choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChoiceTotal {
    pub choice: String,
    pub total: u64,
}

/// Public results for a question. Never carries voter ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub question_id: String,
    pub results: Vec<ChoiceTotal>,
}

/// Count votes per choice and keep only choices with at least `threshold`
/// votes, most popular first (ties by choice text).
pub fn tally<'a>(votes: impl IntoIterator<Item = &'a Vote>, threshold: u64) -> Vec<ChoiceTotal> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for vote in votes {
        *counts.entry(vote.choice.as_str()).or_default() += 1;
    }

    let mut totals: Vec<ChoiceTotal> = counts
        .into_iter()
        .filter(|&(_, total)| total >= threshold)
        .map(|(choice, total)| ChoiceTotal {
            choice: choice.to_string(),
            total,
        })
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.choice.cmp(&b.choice)));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::Timestamp;

    fn votes(choices: &[(&str, usize)]) -> Vec<Vote> {
        let mut out = Vec::new();
        for (choice, n) in choices {
            for i in 0..*n {
                out.push(Vote {
                    question_id: "q".into(),
                    choice: (*choice).into(),
                    voter_id: format!("{choice}-{i}"),
                    created_at: Timestamp::EPOCH,
                });
            }
        }
        out
    }

    #[test]
    fn below_threshold_is_suppressed() {
        let totals = tally(&votes(&[("A", 10), ("B", 9)]), 10);
        assert_eq!(
            totals,
            vec![ChoiceTotal {
                choice: "A".into(),
                total: 10
            }]
        );
    }

    #[test]
    fn ordered_by_total_then_choice() {
        let totals = tally(&votes(&[("b", 3), ("a", 3), ("c", 5)]), 1);
        let order: Vec<&str> = totals.iter().map(|t| t.choice.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn empty_input_gives_empty_results() {
        assert!(tally(std::iter::empty(), 0).is_empty());
    }

    #[test]
    fn results_json_has_no_voter_ids() {
        let results = PollResults {
            question_id: "q".into(),
            results: tally(&votes(&[("A", 2)]), 1),
        };
        let json = serde_json::to_string(&results).unwrap();
        assert_eq!(json, r#"{"questionId":"q","results":[{"choice":"A","total":2}]}"#);
    }
}

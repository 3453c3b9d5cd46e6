//! Binary key layouts.

/// Prefix shared by every `vote_index` key of one question:
/// `len(question) as u16 BE ++ question`.
///
/// The length prefix keeps `("ab", "c")` and `("a", "bc")` apart.
pub fn question_prefix(question_id: &str) -> Vec<u8> {
    let q = question_id.as_bytes();
    let mut key = Vec::with_capacity(2 + q.len());
    key.extend_from_slice(&(q.len() as u16).to_be_bytes());
    key.extend_from_slice(q);
    key
}

/// Uniqueness key for one `(question, voter)` pair.
pub fn vote_index_key(question_id: &str, voter_id: &str) -> Vec<u8> {
    let mut key = question_prefix(question_id);
    key.extend_from_slice(voter_id.as_bytes());
    key
}

/// Decode a big-endian `u64` key or value.
pub fn decode_u64(bytes: &[u8]) -> Option<u64> {
    let arr: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(arr))
}

/// Turn `prefix` into the smallest key greater than every key starting with
/// it. Returns `false` when no such key exists (all bytes were `0xFF`).
pub fn increment_prefix(prefix: &mut Vec<u8>) -> bool {
    while let Some(last) = prefix.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return true;
        }
        prefix.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_prefix_separates_pairs() {
        assert_ne!(vote_index_key("ab", "c"), vote_index_key("a", "bc"));
    }

    #[test]
    fn index_key_starts_with_question_prefix() {
        let key = vote_index_key("q1", "v1");
        assert!(key.starts_with(&question_prefix("q1")));
    }

    #[test]
    fn increment_simple() {
        let mut p = vec![1, 2, 3];
        assert!(increment_prefix(&mut p));
        assert_eq!(p, vec![1, 2, 4]);
    }

    #[test]
    fn increment_carries_past_ff() {
        let mut p = vec![1, 0xFF, 0xFF];
        assert!(increment_prefix(&mut p));
        assert_eq!(p, vec![2]);
    }

    #[test]
    fn increment_all_ff_has_no_upper_bound() {
        let mut p = vec![0xFF, 0xFF];
        assert!(!increment_prefix(&mut p));
        assert!(p.is_empty());
    }

    #[test]
    fn decode_u64_checks_length() {
        assert_eq!(decode_u64(&7u64.to_be_bytes()), Some(7));
        assert_eq!(decode_u64(&[1, 2, 3]), None);
    }
}

//! SHA-256 hashing for the audit chain.

use sha2::{Digest, Sha256};
use tally_types::AuditHash;

/// Compute a SHA-256 hash of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Link digest of one audit entry:
/// `SHA-256(previous_hex || payload || salt)`.
///
/// `previous_hex` is the predecessor's 64-char hex hash, or `""` for the
/// first entry in the chain.
pub fn chain_digest(previous_hex: &str, payload: &str, salt: &[u8]) -> AuditHash {
    AuditHash::new(sha256_multi(&[
        previous_hex.as_bytes(),
        payload.as_bytes(),
        salt,
    ]))
}

/// Short content-derived id for a newly registered poll: `q-` followed by
/// the first 16 hex chars of the digest of its question, options and
/// creation time.
pub fn poll_id_digest(question: &str, options: &[String], created_at_millis: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(question.as_bytes());
    for option in options {
        hasher.update([0u8]);
        hasher.update(option.as_bytes());
    }
    hasher.update(created_at_millis.to_be_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    format!("q-{}", hex::encode(&digest[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_multi_equivalent() {
        let single = sha256(b"helloworld");
        let multi = sha256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn chain_digest_matches_concatenation() {
        let prev = "ab".repeat(32);
        let payload = r#"{"vote":{},"timestamp":1}"#;
        let expected = sha256(format!("{prev}{payload}salt").as_bytes());
        assert_eq!(chain_digest(&prev, payload, b"salt").as_bytes(), &expected);
    }

    #[test]
    fn chain_digest_first_entry_uses_empty_sentinel() {
        let expected = sha256(b"payloadsalt");
        assert_eq!(chain_digest("", "payload", b"salt").as_bytes(), &expected);
    }

    #[test]
    fn chain_digest_depends_on_salt() {
        assert_ne!(
            chain_digest("", "payload", b"one"),
            chain_digest("", "payload", b"two")
        );
    }

    #[test]
    fn poll_id_shape() {
        let id = poll_id_digest("Mood?", &["A".into(), "B".into()], 1);
        assert!(id.starts_with("q-"));
        assert_eq!(id.len(), 18);
    }

    #[test]
    fn poll_id_separates_options() {
        let a = poll_id_digest("Q", &["ab".into(), "c".into()], 1);
        let b = poll_id_digest("Q", &["a".into(), "bc".into()], 1);
        assert_ne!(a, b);
    }
}

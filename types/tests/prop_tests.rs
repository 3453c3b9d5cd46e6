use proptest::prelude::*;

use tally_types::{AuditHash, Timestamp, VoteId};

proptest! {
    /// Hex rendering parses back to the same hash.
    #[test]
    fn audit_hash_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = AuditHash::new(bytes);
        let parsed = AuditHash::from_hex(&hash.to_hex()).unwrap();
        prop_assert_eq!(parsed, hash);
    }

    /// AuditHash::is_zero is true only for all-zero bytes.
    #[test]
    fn audit_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        prop_assert_eq!(AuditHash::new(bytes).is_zero(), bytes == [0u8; 32]);
    }

    /// Key byte order matches numeric order, so store iteration is append order.
    #[test]
    fn vote_id_key_order_matches_numeric(a in any::<u64>(), b in any::<u64>()) {
        prop_assert_eq!(VoteId::new(a).to_key().cmp(&VoteId::new(b).to_key()), a.cmp(&b));
    }

    /// Timestamp ordering is consistent with millisecond ordering.
    #[test]
    fn timestamp_ordering(a in any::<u64>(), b in any::<u64>()) {
        prop_assert_eq!(
            Timestamp::from_millis(a).cmp(&Timestamp::from_millis(b)),
            a.cmp(&b)
        );
    }
}

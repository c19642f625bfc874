use proptest::prelude::*;

use hush_types::{Timestamp, UserId, VoteRecord};

proptest! {
    /// Formatting to RFC 3339 never loses whole seconds.
    #[test]
    fn timestamp_rfc3339_preserves_seconds(secs in 0u64..253_402_300_799) {
        let ts = Timestamp::new(secs);
        let parsed = Timestamp::parse_rfc3339(&ts.to_rfc3339()).unwrap();
        prop_assert_eq!(parsed, ts);
    }

    /// `secs_until` measured from `now` inverts `plus_secs` applied to `now`.
    #[test]
    fn secs_until_inverts_plus(now in 0u64..1u64 << 40, delta in 0u64..1u64 << 20) {
        let now = Timestamp::new(now);
        prop_assert_eq!(now.plus_secs(delta).secs_until(now), delta);
    }

    /// A vote counts as remaining exactly while its expiry lies ahead.
    #[test]
    fn vote_remaining_matches_expiry(expiry in 0u64..10_000, now in 0u64..10_000) {
        let voter = UserId::new("voter");
        let mut record = VoteRecord::new();
        record.votes.insert(voter.clone(), Timestamp::new(expiry));
        let remaining = record.vote_remaining(&voter, Timestamp::new(now));
        if now < expiry {
            prop_assert_eq!(remaining, Some(expiry - now));
        } else {
            prop_assert_eq!(remaining, None);
        }
    }
}

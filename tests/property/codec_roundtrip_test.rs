//! Property-based tests for the canonical codec and its agreement with the
//! diff engine.
//!
//! These verify the serialization laws: decoding an encoded record yields
//! the normalized record, normalization is idempotent, and two records of
//! consistent shape encode identically exactly when the diff is empty.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use gitmarks::services::codec::{decode, encode};
use gitmarks::services::diff::diff_bookmarks;
use gitmarks::types::bookmark::Bookmark;

/// Strategy for text fields: plain ASCII plus a few adversarial values
/// (JSON escapes, padding, non-ASCII).
fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}",
        Just("with \"quotes\" and \\backslash".to_string()),
        Just("  padded  ".to_string()),
        Just("naïve café 東京".to_string()),
    ]
}

fn arb_tags() -> impl Strategy<Value = Option<Vec<String>>> {
    proptest::option::of(proptest::collection::vec("[a-zA-Z]{0,8}", 0..4))
}

/// Whole-second UTC timestamps; stored records have second precision.
fn arb_date() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    proptest::option::of(
        (0i64..4_102_444_800).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap()),
    )
}

fn arb_bookmark() -> impl Strategy<Value = Bookmark> {
    (
        proptest::option::of(arb_text()),
        proptest::option::of("[a-z]{3,10}\\.com(/[a-zA-Z0-9]{0,8})?"),
        arb_tags(),
        proptest::option::of(arb_text()),
        arb_date(),
    )
        .prop_map(|(name, host, tags, notes, date_added)| Bookmark {
            name,
            url: host.map(|h| format!("https://{}", h)),
            tags,
            notes,
            date_added,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// decode(encode(b)) == normalize(b) for every record.
    #[test]
    fn decode_reverses_encode(bookmark in arb_bookmark()) {
        let normalized = bookmark.clone().normalized();
        let decoded = decode(&encode(&bookmark)).expect("own encoding must decode");
        prop_assert_eq!(decoded, normalized);
    }

    /// Normalizing twice is a no-op.
    #[test]
    fn normalization_is_idempotent(bookmark in arb_bookmark()) {
        let once = bookmark.clone().normalized();
        let twice = once.clone().normalized();
        prop_assert_eq!(once, twice);
    }

    /// A normalized record never carries an empty string or empty list.
    #[test]
    fn normalized_records_have_no_empty_fields(bookmark in arb_bookmark()) {
        let b = bookmark.normalized();
        for field in [&b.name, &b.url, &b.notes] {
            if let Some(s) = field {
                prop_assert!(!s.trim().is_empty());
                prop_assert_eq!(s.trim(), s.as_str());
            }
        }
        if let Some(tags) = &b.tags {
            prop_assert!(!tags.is_empty());
            prop_assert!(tags.iter().all(|t| !t.is_empty()));
        }
    }

    /// Encoding is deterministic.
    #[test]
    fn encode_is_a_pure_function(bookmark in arb_bookmark()) {
        prop_assert_eq!(encode(&bookmark), encode(&bookmark));
    }

    /// For normalized records sharing their (immutable) date_added, the
    /// diff is empty exactly when the encodings are byte-identical.
    #[test]
    fn diff_is_empty_iff_encodings_agree(
        a in arb_bookmark(),
        b in arb_bookmark(),
        date in arb_date(),
    ) {
        let mut a = a.normalized();
        let mut b = b.normalized();
        a.date_added = date;
        b.date_added = date;
        let changes = diff_bookmarks(Some(&a), Some(&b));
        prop_assert_eq!(changes.is_empty(), encode(&a) == encode(&b));
    }
}

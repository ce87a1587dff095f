// Property-based tests for item identity and date normalization

use common::models::DateFormat;
use common::source::{extract_post_id, normalize_date, notice_id, source_tag};
use proptest::prelude::*;

fn provider() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

fn category() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,9}"
}

/// Raw post numbers as boards print them: dashes, dots and reserved characters
fn post_id() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9_.~/&=# -]{0,12}"
}

/// Minimal form-urlencoding of a query value
fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

proptest! {
    /// *For any* two distinct (provider, category, post id) triples, the ids differ.
    #[test]
    fn property_notice_ids_never_collide(
        a in (provider(), category(), post_id()),
        b in (provider(), category(), post_id()),
    ) {
        prop_assume!((&a.0, a.1.to_ascii_lowercase(), &a.2) != (&b.0, b.1.to_ascii_lowercase(), &b.2));
        let link_a = format!("https://board.example.ac.kr/view.do?articleNo={}", encode(&a.2));
        let link_b = format!("https://board.example.ac.kr/view.do?articleNo={}", encode(&b.2));

        let id_a = notice_id(&source_tag(&a.0, &a.1), &link_a).unwrap();
        let id_b = notice_id(&source_tag(&b.0, &b.1), &link_b).unwrap();

        prop_assert_ne!(id_a, id_b);
    }

    /// *For any* encoded value, the whole decoded value is the post id.
    #[test]
    fn property_parameter_value_round_trips(value in post_id()) {
        let link = format!("https://board.example.ac.kr/view.do?mode=view&seq={}#list", encode(&value));
        prop_assert_eq!(extract_post_id(&link).unwrap(), value);
    }

    /// *For any* query mixing a generic `id` with `articleNo`, `articleNo`
    /// decides the post id regardless of order.
    #[test]
    fn property_parameter_priority_is_order_independent(
        generic in post_id(),
        article in post_id(),
        article_first in any::<bool>(),
    ) {
        let (g, a) = (encode(&generic), encode(&article));
        let query = if article_first {
            format!("articleNo={}&id={}", a, g)
        } else {
            format!("id={}&articleNo={}", g, a)
        };
        let link = format!("https://board.example.ac.kr/view.do?{}", query);
        prop_assert_eq!(extract_post_id(&link).unwrap(), article);
    }

    /// *For any* numeric path segment, it is taken as the post id.
    #[test]
    fn property_numeric_segment_is_post_id(number in 1u64..10_000_000u64) {
        let link = format!("https://lib.example.ac.kr/notice/{}", number);
        prop_assert_eq!(extract_post_id(&link).unwrap(), number.to_string());
    }

    /// *For any* valid calendar date, each accepted spelling normalizes to the
    /// same string in the requested format.
    #[test]
    fn property_date_spellings_normalize_alike(
        year in 2000i32..2099,
        month in 1u32..=12,
        day in 1u32..=28,
    ) {
        let dotted = format!("{:04}.{:02}.{:02}", year, month, day);
        let spellings = [
            dotted.clone(),
            format!("{:04}-{}-{}", year, month, day),
            format!("{:04}/{:02}/{:02}", year, month, day),
            format!("{:02}.{:02}.{:02}", year % 100, month, day),
        ];

        for raw in &spellings {
            prop_assert_eq!(normalize_date(raw, DateFormat::Dotted).unwrap(), dotted.clone());
            prop_assert_eq!(
                normalize_date(raw, DateFormat::Dashed).unwrap(),
                format!("{:04}-{:02}-{:02}", year, month, day)
            );
        }
    }
}

//! Identifier-keyed merging of chapter sequences.

use std::collections::HashSet;

use crate::model::Chapter;

/// Merges `incoming` into `existing`.
///
/// The result is the union of both inputs keyed by chapter identifier,
/// sorted by chapter number. When both sides hold the same identifier the
/// existing entry is kept. Merging the same input twice is a no-op.
#[must_use]
pub fn merge_chapters(existing: &[Chapter], incoming: &[Chapter]) -> Vec<Chapter> {
    let mut seen: HashSet<_> = existing.iter().map(|c| c.id).collect();
    let mut merged = existing.to_vec();
    for chapter in incoming {
        if seen.insert(chapter.id) {
            merged.push(chapter.clone());
        }
    }
    merged.sort_by_key(|c| (c.number, c.id));
    merged
}

/// Returns the number of the last chapter, or 0 for an empty sequence.
#[must_use]
pub fn latest_number(chapters: &[Chapter]) -> u32 {
    chapters.last().map_or(0, |c| c.number)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    use super::*;
    use crate::ids::ChapterId;
    use crate::model::ChapterContent;

    fn chapter(id: i64, number: u32) -> Chapter {
        Chapter {
            id: ChapterId(id),
            number,
            content: ChapterContent {
                title: format!("Chapter {number}"),
                text: String::new(),
            },
            image_url: None,
            mood_tag: None,
            choices: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    fn ids(chapters: &[Chapter]) -> Vec<i64> {
        chapters.iter().map(|c| c.id.0).collect()
    }

    #[test]
    fn test_merge_appends_unknown_chapters_in_number_order() {
        // Arrange
        let existing = vec![chapter(10, 1), chapter(11, 2)];
        let incoming = vec![chapter(13, 4), chapter(12, 3)];

        // Act
        let merged = merge_chapters(&existing, &incoming);

        // Assert
        assert_eq!(ids(&merged), vec![10, 11, 12, 13]);
        assert_eq!(latest_number(&merged), 4);
    }

    #[test]
    fn test_merge_drops_duplicate_identifiers() {
        let existing = vec![chapter(10, 1), chapter(11, 2)];
        let incoming = vec![chapter(11, 2), chapter(12, 3)];

        let merged = merge_chapters(&existing, &incoming);

        assert_eq!(ids(&merged), vec![10, 11, 12]);
    }

    #[test]
    fn test_merge_into_empty_sorts_incoming() {
        let merged = merge_chapters(&[], &[chapter(3, 3), chapter(1, 1), chapter(2, 2)]);
        assert_eq!(ids(&merged), vec![1, 2, 3]);
    }

    #[test]
    fn test_latest_number_of_empty_sequence_is_zero() {
        assert_eq!(latest_number(&[]), 0);
    }

    fn arb_chapters() -> impl Strategy<Value = Vec<Chapter>> {
        // Number is derived from the id so duplicates agree on position.
        prop::collection::vec(0_u32..20, 0..12).prop_map(|ids| {
            ids.into_iter()
                .map(|id| chapter(i64::from(id), id + 1))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(existing in arb_chapters(), incoming in arb_chapters()) {
            let once = merge_chapters(&existing, &incoming);
            let twice = merge_chapters(&once, &incoming);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn merge_never_repeats_an_identifier(existing in arb_chapters(), incoming in arb_chapters()) {
            let merged = merge_chapters(&merge_chapters(&[], &existing), &incoming);
            let unique: HashSet<_> = merged.iter().map(|c| c.id).collect();
            prop_assert_eq!(unique.len(), merged.len());
        }

        #[test]
        fn merge_order_does_not_change_membership(a in arb_chapters(), b in arb_chapters()) {
            let left = merge_chapters(&merge_chapters(&[], &a), &b);
            let right = merge_chapters(&merge_chapters(&[], &b), &a);
            prop_assert_eq!(ids(&left), ids(&right));
        }
    }
}

//! Story and chapter builders.

use chrono::{DateTime, TimeZone, Utc};
use taleweave_core::ids::{ChapterId, StoryId};
use taleweave_core::model::{Chapter, ChapterContent, ChoicePair, Story, StoryMode};

/// Fixed timestamp shared by fixtures.
///
/// # Panics
///
/// Never in practice; the date is a valid constant.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// An interactive story listing the given chapter identifiers.
#[must_use]
pub fn story(id: i64, chapter_ids: &[i64]) -> Story {
    Story {
        id: StoryId(id),
        title: format!("Story {id}"),
        mode: StoryMode::Interactive,
        created_at: fixed_now(),
        chapter_ids: chapter_ids.iter().copied().map(ChapterId).collect(),
    }
}

/// A terminal chapter (no choices).
#[must_use]
pub fn chapter(id: i64, number: u32) -> Chapter {
    Chapter {
        id: ChapterId(id),
        number,
        content: ChapterContent {
            title: format!("Chapter {number}"),
            text: format!("Text of chapter {number}."),
        },
        image_url: None,
        mood_tag: None,
        choices: None,
        created_at: fixed_now(),
    }
}

/// A chapter that ends in an A/B choice.
#[must_use]
pub fn chapter_with_choices(id: i64, number: u32) -> Chapter {
    Chapter {
        choices: Some(ChoicePair {
            a: format!("Option A after {number}"),
            b: format!("Option B after {number}"),
        }),
        ..chapter(id, number)
    }
}

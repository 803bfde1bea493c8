//! Shared cache of chapter sequences.

use crate::ids::StoryId;
use crate::model::Chapter;

/// Per-story cache of previously fetched chapters.
///
/// Several reading sessions of the same story may share one cache. Writes
/// go through [`SessionCache::merge`] so a session can never discard
/// chapters another session already stored.
pub trait SessionCache: Send + Sync {
    /// Returns the cached sequence for a story, if any.
    fn get(&self, story_id: StoryId) -> Option<Vec<Chapter>>;

    /// Merges `chapters` into the cached sequence by chapter identifier and
    /// returns the merged result, sorted by chapter number.
    fn merge(&self, story_id: StoryId, chapters: &[Chapter]) -> Vec<Chapter>;
}

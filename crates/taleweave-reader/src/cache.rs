//! In-memory `SessionCache`.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use taleweave_core::cache::SessionCache;
use taleweave_core::ids::StoryId;
use taleweave_core::model::Chapter;
use taleweave_core::sequence::merge_chapters;

/// Process-local chapter cache shared by every reader of a story.
#[derive(Debug, Default)]
pub struct InMemorySessionCache {
    entries: Mutex<HashMap<StoryId, Vec<Chapter>>>,
}

impl InMemorySessionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionCache for InMemorySessionCache {
    fn get(&self, story_id: StoryId) -> Option<Vec<Chapter>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&story_id)
            .cloned()
    }

    fn merge(&self, story_id: StoryId, chapters: &[Chapter]) -> Vec<Chapter> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(story_id).or_default();
        *entry = merge_chapters(entry, chapters);
        entry.clone()
    }
}

//! Shared helpers for session controller tests.
#![allow(dead_code)]

use std::sync::Arc;

use taleweave_core::credentials::Credentials;
use taleweave_core::model::Chapter;
use taleweave_reader::application::controller::SessionController;
use taleweave_reader::cache::InMemorySessionCache;
use taleweave_test_support::{
    RecordingSignOut, ScriptedStoryService, StepClock, chapter_with_choices, story,
};

/// A controller wired to scripted collaborators the test can inspect.
pub struct Harness {
    pub controller: SessionController,
    pub service: Arc<ScriptedStoryService>,
    pub cache: Arc<InMemorySessionCache>,
    pub sign_out: Arc<RecordingSignOut>,
    pub clock: Arc<StepClock>,
}

/// Builds a controller around `service` with a fresh cache.
pub fn harness(service: ScriptedStoryService) -> Harness {
    harness_sharing(Arc::new(service), Arc::new(InMemorySessionCache::new()))
}

/// Builds a controller that shares `service` and `cache` with other harnesses.
pub fn harness_sharing(
    service: Arc<ScriptedStoryService>,
    cache: Arc<InMemorySessionCache>,
) -> Harness {
    let sign_out = Arc::new(RecordingSignOut::new());
    let clock = Arc::new(StepClock::default());
    let controller = SessionController::new(
        service.clone(),
        cache.clone(),
        sign_out.clone(),
        clock.clone(),
        Credentials::bearer("test-token"),
    );
    Harness {
        controller,
        service,
        cache,
        sign_out,
        clock,
    }
}

/// Three interactive chapters with ids 10, 11, 12.
pub fn three_chapters() -> Vec<Chapter> {
    vec![
        chapter_with_choices(10, 1),
        chapter_with_choices(11, 2),
        chapter_with_choices(12, 3),
    ]
}

/// Story 1 with [`three_chapters`].
pub fn three_chapter_service() -> ScriptedStoryService {
    ScriptedStoryService::new().with_story(story(1, &[10, 11, 12]), three_chapters())
}

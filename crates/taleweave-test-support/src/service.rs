//! Scripted `StoryService` that returns canned responses and records calls.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use taleweave_core::credentials::Credentials;
use taleweave_core::error::ServiceError;
use taleweave_core::ids::StoryId;
use taleweave_core::model::{Chapter, Choice, Story};
use taleweave_core::service::StoryService;
use tokio::sync::Notify;

/// A call observed by [`ScriptedStoryService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    /// `fetch_story` was called.
    FetchStory(StoryId),
    /// `fetch_chapters` was called.
    FetchChapters(StoryId),
    /// `request_next_chapter` was called.
    NextChapter(StoryId, Choice),
}

/// A story service driven entirely by test setup.
///
/// Unknown stories answer `NotFound`. `request_next_chapter` pops results
/// from a queue and answers with a transport error once it is empty.
/// Gates hold a call open until the test releases it with
/// [`Notify::notify_one`], which lets tests observe in-flight behaviour.
#[derive(Debug, Default)]
pub struct ScriptedStoryService {
    stories: Mutex<HashMap<StoryId, Result<Story, ServiceError>>>,
    chapters: Mutex<HashMap<StoryId, Result<Vec<Chapter>, ServiceError>>>,
    next_chapters: Mutex<VecDeque<Result<Chapter, ServiceError>>>,
    calls: Mutex<Vec<ServiceCall>>,
    chapter_gates: Mutex<HashMap<StoryId, Arc<Notify>>>,
    next_chapter_gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedStoryService {
    /// Creates a service that knows no stories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a story together with its chapter list.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    #[must_use]
    pub fn with_story(self, story: Story, chapters: Vec<Chapter>) -> Self {
        self.set_chapters(story.id, Ok(chapters));
        self.stories.lock().unwrap().insert(story.id, Ok(story));
        self
    }

    /// Makes both fetches for `story_id` fail with `error`.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    #[must_use]
    pub fn with_failure(self, story_id: StoryId, error: ServiceError) -> Self {
        self.set_chapters(story_id, Err(error.clone()));
        self.stories.lock().unwrap().insert(story_id, Err(error));
        self
    }

    /// Replaces what `fetch_chapters` returns for `story_id`.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    pub fn set_chapters(&self, story_id: StoryId, result: Result<Vec<Chapter>, ServiceError>) {
        self.chapters.lock().unwrap().insert(story_id, result);
    }

    /// Queues the result of the next `request_next_chapter` call.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    pub fn push_next_chapter(&self, result: Result<Chapter, ServiceError>) {
        self.next_chapters.lock().unwrap().push_back(result);
    }

    /// Holds every `fetch_chapters` call for `story_id` until the returned
    /// gate is notified.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    pub fn gate_chapters(&self, story_id: StoryId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.chapter_gates
            .lock()
            .unwrap()
            .insert(story_id, Arc::clone(&gate));
        gate
    }

    /// Holds every `request_next_chapter` call until the returned gate is
    /// notified.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    pub fn gate_next_chapter(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.next_chapter_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Returns a snapshot of every call made so far.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of `request_next_chapter` calls made so far.
    pub fn next_chapter_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ServiceCall::NextChapter(..)))
            .count()
    }

    fn record(&self, call: ServiceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl StoryService for ScriptedStoryService {
    async fn fetch_story(
        &self,
        _credentials: &Credentials,
        story_id: StoryId,
    ) -> Result<Story, ServiceError> {
        self.record(ServiceCall::FetchStory(story_id));
        self.stories
            .lock()
            .unwrap()
            .get(&story_id)
            .cloned()
            .unwrap_or(Err(ServiceError::NotFound))
    }

    async fn fetch_chapters(
        &self,
        _credentials: &Credentials,
        story_id: StoryId,
    ) -> Result<Vec<Chapter>, ServiceError> {
        self.record(ServiceCall::FetchChapters(story_id));
        let gate = self.chapter_gates.lock().unwrap().get(&story_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.chapters
            .lock()
            .unwrap()
            .get(&story_id)
            .cloned()
            .unwrap_or(Err(ServiceError::NotFound))
    }

    async fn request_next_chapter(
        &self,
        _credentials: &Credentials,
        story_id: StoryId,
        choice: Choice,
    ) -> Result<Chapter, ServiceError> {
        self.record(ServiceCall::NextChapter(story_id, choice));
        let gate = self.next_chapter_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.next_chapters
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Transport("no scripted chapter".into())))
    }
}

//! Read-only views of a reading session for the display layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use taleweave_core::ids::StoryId;
use taleweave_core::model::{Chapter, ChoicePair, Choice};

use crate::domain::session::{ReaderSession, SessionPhase};

/// What the reader screen should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    /// No story is open.
    Idle,
    /// Spinner while the story loads.
    Loading,
    /// The story does not exist.
    NotFound,
    /// The reader was signed out.
    SignedOut,
    /// Loading failed; offer to retry.
    Unavailable,
    /// The story has no chapters yet.
    Empty,
    /// A chapter is on display.
    Reading,
    /// The chapter on display ends the story.
    TheEnd,
}

/// One chapter as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterView {
    /// Chapter number.
    pub number: u32,
    /// Heading.
    pub title: String,
    /// Body text.
    pub text: String,
    /// Illustration.
    pub image_url: Option<String>,
}

impl From<&Chapter> for ChapterView {
    fn from(chapter: &Chapter) -> Self {
        Self {
            number: chapter.number,
            title: chapter.content.title.clone(),
            text: chapter.content.text.clone(),
            image_url: chapter.image_url.clone(),
        }
    }
}

/// Snapshot of a reading session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Story being read.
    pub story_id: Option<StoryId>,
    /// Story title, once loaded.
    pub title: Option<String>,
    /// Screen to show.
    pub state: DisplayState,
    /// 1-based position of the chapter on display.
    pub position: usize,
    /// Number of chapters known.
    pub total: usize,
    /// The chapter on display.
    pub chapter: Option<ChapterView>,
    /// Branch labels, present only when the reader may choose.
    pub choices: Option<ChoicePair>,
    /// Whether an earlier chapter exists.
    pub can_go_back: bool,
    /// Whether a later chapter exists.
    pub can_go_forward: bool,
    /// Branch being generated, if any.
    pub advancing: Option<Choice>,
    /// Message for the last failure.
    pub error: Option<String>,
    /// Whether the failed action can be retried.
    pub retryable: bool,
    /// When chapters were last received.
    pub synced_at: Option<DateTime<Utc>>,
}

/// Builds the display snapshot of `session`.
#[must_use]
pub fn session_view(session: &ReaderSession) -> SessionView {
    let current = session.current_chapter();
    let total = session.chapters().len();

    let state = match session.phase() {
        SessionPhase::Idle => DisplayState::Idle,
        SessionPhase::Loading => DisplayState::Loading,
        SessionPhase::NotFound => DisplayState::NotFound,
        SessionPhase::SignedOut => DisplayState::SignedOut,
        SessionPhase::Unavailable => DisplayState::Unavailable,
        SessionPhase::Ready | SessionPhase::Advancing(_) => match current {
            None => DisplayState::Empty,
            Some(chapter) if chapter.is_terminal() => DisplayState::TheEnd,
            Some(_) => DisplayState::Reading,
        },
    };
    let advancing = match session.phase() {
        SessionPhase::Advancing(choice) => Some(choice),
        _ => None,
    };
    let choices = if session.choices_offered() {
        current.and_then(|chapter| chapter.choices.clone())
    } else {
        None
    };
    let reading = matches!(state, DisplayState::Reading | DisplayState::TheEnd);

    SessionView {
        story_id: session.story_id(),
        title: session.story().map(|story| story.title.clone()),
        state,
        position: if total == 0 { 0 } else { session.cursor() + 1 },
        total,
        chapter: current.map(ChapterView::from),
        choices,
        can_go_back: reading && session.cursor() > 0,
        can_go_forward: reading && session.cursor() + 1 < total,
        advancing,
        error: session.last_error().map(ToString::to_string),
        retryable: session.last_error().is_some_and(|err| err.is_retryable()),
        synced_at: session.synced_at(),
    }
}

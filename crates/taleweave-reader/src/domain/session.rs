//! The reading session: one story's chapters, a cursor, and the request
//! lifecycle around them.

use chrono::{DateTime, Utc};
use taleweave_core::error::SessionError;
use taleweave_core::ids::{ChapterId, SessionId, StoryId};
use taleweave_core::model::{Chapter, Choice, Story};
use taleweave_core::sequence::{latest_number, merge_chapters};

use super::tickets::{AdvanceTicket, LoadTicket};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Nothing is open.
    #[default]
    Idle,
    /// The story and its chapters are being fetched.
    Loading,
    /// Chapters are available for reading.
    Ready,
    /// Chapters are readable and the next one is being generated.
    Advancing(Choice),
    /// The story does not exist or is not visible to the reader.
    NotFound,
    /// The credentials were rejected.
    SignedOut,
    /// The story could not be loaded for another reason.
    Unavailable,
}

/// Result of a successful advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The new chapter was appended and is now current.
    Appended {
        /// The new chapter.
        chapter_id: ChapterId,
        /// Its number.
        number: u32,
    },
    /// A concurrent refresh had already brought the chapter in; it is now current.
    AlreadyPresent {
        /// The new chapter.
        chapter_id: ChapterId,
        /// Its number.
        number: u32,
    },
    /// The server was already advancing the story. Nothing changed.
    Suppressed,
}

/// Client-side view of one story being read.
///
/// Chapters are only ever added. The cursor always points into the chapter
/// sequence when it is non-empty, and is moved to the latest chapter
/// whenever chapters arrive from the server.
#[derive(Debug, Default)]
pub struct ReaderSession {
    session_id: Option<SessionId>,
    story_id: Option<StoryId>,
    story: Option<Story>,
    chapters: Vec<Chapter>,
    cursor: usize,
    phase: SessionPhase,
    last_error: Option<SessionError>,
    synced_at: Option<DateTime<Utc>>,
}

impl ReaderSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts loading `story_id`, discarding whatever was open before.
    pub fn begin_open(&mut self, story_id: StoryId, session_id: SessionId) -> LoadTicket {
        *self = Self {
            session_id: Some(session_id),
            story_id: Some(story_id),
            phase: SessionPhase::Loading,
            ..Self::default()
        };
        LoadTicket {
            session_id,
            story_id,
        }
    }

    /// Applies the result of an open.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Superseded` if the ticket belongs to an older
    /// session, otherwise the load error that was passed in. A rejected
    /// token is reported as `Unauthorized` even for an older session.
    pub fn complete_open(
        &mut self,
        ticket: LoadTicket,
        result: Result<(Story, Vec<Chapter>), SessionError>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if !self.is_current(ticket.session_id) || self.phase != SessionPhase::Loading {
            return Err(stale_error(&result));
        }

        match result {
            Ok((story, chapters)) => {
                self.story = Some(story);
                self.chapters = merge_chapters(&self.chapters, &chapters);
                self.cursor = self.latest_index();
                self.phase = SessionPhase::Ready;
                self.synced_at = Some(now);
                Ok(())
            }
            Err(err) => {
                self.phase = match err {
                    SessionError::NotFound(_) => SessionPhase::NotFound,
                    SessionError::Unauthorized => SessionPhase::SignedOut,
                    _ => SessionPhase::Unavailable,
                };
                self.chapters.clear();
                self.cursor = 0;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Shows chapters already known locally while the open is in flight.
    /// Does nothing unless `ticket` belongs to the session still loading.
    pub fn preload(&mut self, ticket: LoadTicket, chapters: &[Chapter]) {
        if self.is_current(ticket.session_id) && self.phase == SessionPhase::Loading {
            self.chapters = merge_chapters(&[], chapters);
            self.cursor = self.latest_index();
        }
    }

    /// Moves to the previous chapter. Returns `false` if the cursor did not move.
    pub fn go_to_previous(&mut self) -> bool {
        if !self.is_navigable() || self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Moves to the next chapter. Returns `false` if the cursor did not move.
    pub fn go_to_next(&mut self) -> bool {
        if !self.is_navigable() || self.cursor + 1 >= self.chapters.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Returns `true` if the cursor is on the latest chapter.
    #[must_use]
    pub fn is_at_latest(&self) -> bool {
        !self.chapters.is_empty() && self.cursor == self.latest_index()
    }

    /// Returns `true` if the reader may pick a branch right now.
    #[must_use]
    pub fn choices_offered(&self) -> bool {
        self.phase == SessionPhase::Ready
            && self.is_at_latest()
            && self
                .current_chapter()
                .is_some_and(|chapter| !chapter.is_terminal())
    }

    /// Marks an advance as in flight.
    ///
    /// # Errors
    ///
    /// * `AdvanceInFlight` if another advance has not resolved yet.
    /// * `NotReady` if no story is loaded.
    /// * `NotAtLatest` if the reader is looking at an earlier chapter.
    /// * `NoChoices` if the latest chapter ends the story.
    pub fn begin_advance(&mut self, choice: Choice) -> Result<AdvanceTicket, SessionError> {
        match self.phase {
            SessionPhase::Advancing(_) => return Err(SessionError::AdvanceInFlight),
            SessionPhase::Ready => {}
            _ => return Err(SessionError::NotReady),
        }
        let (Some(session_id), Some(story_id)) = (self.session_id, self.story_id) else {
            return Err(SessionError::NotReady);
        };
        if !self.is_at_latest() {
            return Err(SessionError::NotAtLatest);
        }
        if self
            .current_chapter()
            .is_none_or(|chapter| chapter.is_terminal())
        {
            return Err(SessionError::NoChoices);
        }

        self.phase = SessionPhase::Advancing(choice);
        self.last_error = None;
        Ok(AdvanceTicket {
            session_id,
            story_id,
            choice,
            latest_number: latest_number(&self.chapters),
        })
    }

    /// Applies the result of an advance.
    ///
    /// A returned chapter is reconciled by identifier against the current
    /// sequence, which may have grown since the request was issued. A
    /// chapter already in the sequence is only accepted if it is numbered
    /// above the latest chapter at the time of the request.
    ///
    /// # Errors
    ///
    /// * `Superseded` if the ticket belongs to an older session.
    /// * `IntegrityViolation` if the chapter number does not follow the
    ///   latest chapter, or the server answered with a chapter the reader
    ///   already had. Nothing is inserted; the caller should reload.
    /// * The request error otherwise, except `Conflict`, which is
    ///   suppressed.
    pub fn complete_advance(
        &mut self,
        ticket: AdvanceTicket,
        result: Result<Chapter, SessionError>,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, SessionError> {
        if !self.is_current(ticket.session_id) || !self.is_advancing() {
            return Err(stale_error(&result));
        }
        self.phase = SessionPhase::Ready;

        match result {
            Ok(chapter) => self.reconcile_advance(ticket.latest_number, chapter, now),
            Err(SessionError::Conflict(_)) => Ok(AdvanceOutcome::Suppressed),
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    fn reconcile_advance(
        &mut self,
        requested_after: u32,
        chapter: Chapter,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, SessionError> {
        let chapter_id = chapter.id;
        let number = chapter.number;

        if let Some(index) = self.chapters.iter().position(|c| c.id == chapter_id) {
            if number > requested_after {
                self.cursor = index;
                return Ok(AdvanceOutcome::AlreadyPresent { chapter_id, number });
            }
            return Err(self.integrity_violation(requested_after + 1, number));
        }

        let expected = latest_number(&self.chapters) + 1;
        if number != expected {
            return Err(self.integrity_violation(expected, number));
        }

        self.chapters.push(chapter);
        self.cursor = self.latest_index();
        self.synced_at = Some(now);
        Ok(AdvanceOutcome::Appended { chapter_id, number })
    }

    fn integrity_violation(&mut self, expected: u32, received: u32) -> SessionError {
        let err = SessionError::IntegrityViolation { expected, received };
        self.last_error = Some(err.clone());
        err
    }

    /// Issues a ticket for re-fetching the chapter list, if a story is loaded.
    #[must_use]
    pub fn begin_refresh(&self) -> Option<LoadTicket> {
        if !self.is_navigable() {
            return None;
        }
        Some(LoadTicket {
            session_id: self.session_id?,
            story_id: self.story_id?,
        })
    }

    /// Merges a re-fetched chapter list and moves the cursor to the latest
    /// chapter. An in-flight advance is left alone.
    ///
    /// # Errors
    ///
    /// Returns `Superseded` for stale tickets, otherwise the fetch error.
    pub fn complete_refresh(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Chapter>, SessionError>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if !self.is_current(ticket.session_id) || !self.is_navigable() {
            return Err(stale_error(&result));
        }

        match result {
            Ok(chapters) => {
                self.chapters = merge_chapters(&self.chapters, &chapters);
                self.cursor = self.latest_index();
                self.synced_at = Some(now);
                Ok(())
            }
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Releases everything. Closing an idle session does nothing.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    fn record_failure(&mut self, err: &SessionError) {
        if *err == SessionError::Unauthorized {
            self.phase = SessionPhase::SignedOut;
        }
        self.last_error = Some(err.clone());
    }

    fn is_current(&self, session_id: SessionId) -> bool {
        self.session_id == Some(session_id)
    }

    fn is_navigable(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Ready | SessionPhase::Advancing(_)
        )
    }

    fn latest_index(&self) -> usize {
        self.chapters.len().saturating_sub(1)
    }

    /// Current session identity.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Story being read.
    #[must_use]
    pub fn story_id(&self) -> Option<StoryId> {
        self.story_id
    }

    /// Story metadata, once loaded.
    #[must_use]
    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    /// Chapters in order.
    #[must_use]
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Index of the chapter on display.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The chapter on display.
    #[must_use]
    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.chapters.get(self.cursor)
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Returns `true` while a chapter is being generated.
    #[must_use]
    pub fn is_advancing(&self) -> bool {
        matches!(self.phase, SessionPhase::Advancing(_))
    }

    /// Most recent failure, cleared when the next advance starts.
    #[must_use]
    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// When chapters were last received from the server.
    #[must_use]
    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }
}

/// Error for a response whose session is gone. The state is left alone, but
/// a rejected token still has to reach the sign-out hook.
fn stale_error<T>(result: &Result<T, SessionError>) -> SessionError {
    match result {
        Err(SessionError::Unauthorized) => SessionError::Unauthorized,
        _ => SessionError::Superseded,
    }
}

//! The session controller: runs a [`ReaderSession`] against the story
//! service, the shared cache and the sign-out hook.
//!
//! The session lock is only taken between awaits, so navigation keeps
//! working while a request is outstanding. Every response is applied with
//! the ticket issued for its request, which makes responses for a replaced
//! or closed session inert.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taleweave_core::cache::SessionCache;
use taleweave_core::clock::Clock;
use taleweave_core::credentials::{Credentials, SignOut};
use taleweave_core::error::SessionError;
use taleweave_core::ids::{SessionId, StoryId};
use taleweave_core::model::Choice;
use taleweave_core::service::StoryService;
use tracing::{debug, info, instrument, warn};

use super::query_handlers::{SessionView, session_view};
use crate::domain::session::{AdvanceOutcome, ReaderSession};
use crate::domain::tickets::LoadTicket;

/// Drives one reader view.
pub struct SessionController {
    service: Arc<dyn StoryService>,
    cache: Arc<dyn SessionCache>,
    sign_out: Arc<dyn SignOut>,
    clock: Arc<dyn Clock>,
    credentials: Credentials,
    session: Mutex<ReaderSession>,
}

impl SessionController {
    /// Creates a controller with nothing open.
    #[must_use]
    pub fn new(
        service: Arc<dyn StoryService>,
        cache: Arc<dyn SessionCache>,
        sign_out: Arc<dyn SignOut>,
        clock: Arc<dyn Clock>,
        credentials: Credentials,
    ) -> Self {
        Self {
            service,
            cache,
            sign_out,
            clock,
            credentials,
            session: Mutex::new(ReaderSession::new()),
        }
    }

    fn session(&self) -> MutexGuard<'_, ReaderSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens `story_id`, replacing any session that was open.
    ///
    /// Chapters already in the shared cache are shown while the story loads.
    /// Story metadata and chapters are fetched concurrently; the chapters are
    /// merged into the shared cache before being shown.
    ///
    /// # Errors
    ///
    /// * `NotFound`, `Unauthorized` or `Unavailable` if the fetch failed.
    /// * `Superseded` if another story was opened before this one loaded,
    ///   unless the token was rejected, which is always `Unauthorized`.
    #[instrument(skip_all, fields(story_id = %story_id))]
    pub async fn open(&self, story_id: StoryId) -> Result<(), SessionError> {
        let ticket = self.session().begin_open(story_id, SessionId::new());
        info!(session_id = %ticket.session_id, "opening story");

        if let Some(cached) = self.cache.get(story_id) {
            debug!(chapters = cached.len(), "showing cached chapters while loading");
            self.session().preload(ticket, &cached);
        }

        let fetched = tokio::try_join!(
            self.service.fetch_story(&self.credentials, story_id),
            self.service.fetch_chapters(&self.credentials, story_id),
        )
        .map(|(story, chapters)| (story, self.cache.merge(story_id, &chapters)))
        .map_err(|err| SessionError::from_service(err, story_id));

        let result = self.session().complete_open(ticket, fetched, self.clock.now());
        self.observe(result)
    }

    /// Re-fetches the chapter list and merges it into the open session.
    ///
    /// # Errors
    ///
    /// * `NotReady` if no story is loaded.
    /// * The fetch error, or `Superseded` if the session was replaced.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let Some(ticket) = self.session().begin_refresh() else {
            return Err(SessionError::NotReady);
        };
        self.reload(ticket).await
    }

    /// Requests the chapter following `choice` and makes it current.
    ///
    /// Rejected without a request when the reader is not on the latest
    /// chapter, the chapter has no choices, or an advance is already in
    /// flight. If the server answers with a chapter number that does not
    /// follow the latest chapter, the full sequence is reloaded and the
    /// returned chapter is discarded.
    ///
    /// # Errors
    ///
    /// * Precondition errors: `NotReady`, `NotAtLatest`, `NoChoices`,
    ///   `AdvanceInFlight`.
    /// * `GenerationFailed`, `Unavailable`, `NotFound`, `Unauthorized` from
    ///   the request. The sequence is unchanged and the choice can be retried.
    /// * `IntegrityViolation` after the reload it triggered.
    /// * `Superseded` if the session was replaced while the request ran.
    #[instrument(skip_all, fields(choice = %choice))]
    pub async fn advance(&self, choice: Choice) -> Result<AdvanceOutcome, SessionError> {
        let ticket = self.session().begin_advance(choice).inspect_err(|err| {
            debug!(error = %err, "advance rejected");
        })?;
        let story_id = ticket.story_id;
        info!(story_id = %story_id, session_id = %ticket.session_id, "requesting next chapter");

        let response = self
            .service
            .request_next_chapter(&self.credentials, story_id, choice)
            .await
            .map_err(|err| SessionError::from_service(err, story_id));
        let chapter = response.as_ref().ok().cloned();

        let result = self
            .session()
            .complete_advance(ticket, response, self.clock.now());

        match &result {
            Ok(
                AdvanceOutcome::Appended { number, .. }
                | AdvanceOutcome::AlreadyPresent { number, .. },
            ) => {
                if let Some(chapter) = chapter {
                    self.cache.merge(story_id, &[chapter]);
                }
                info!(story_id = %story_id, chapter_number = number, "chapter added");
            }
            Ok(AdvanceOutcome::Suppressed) => {
                debug!(story_id = %story_id, "server already advancing story, ignoring");
            }
            Err(SessionError::IntegrityViolation { expected, received }) => {
                warn!(
                    story_id = %story_id,
                    expected,
                    received,
                    "chapter number out of sequence, reloading chapters"
                );
                let reload = self.session().begin_refresh();
                if let Some(reload) = reload.filter(|t| t.session_id == ticket.session_id) {
                    if let Err(err) = self.reload(reload).await {
                        warn!(
                            story_id = %story_id,
                            error = %err,
                            "reload after integrity violation failed"
                        );
                    }
                }
            }
            Err(_) => {}
        }

        self.observe(result)
    }

    async fn reload(&self, ticket: LoadTicket) -> Result<(), SessionError> {
        let story_id = ticket.story_id;
        let fetched = self
            .service
            .fetch_chapters(&self.credentials, story_id)
            .await
            .map(|chapters| self.cache.merge(story_id, &chapters))
            .map_err(|err| SessionError::from_service(err, story_id));

        let result = self
            .session()
            .complete_refresh(ticket, fetched, self.clock.now());
        self.observe(result)
    }

    fn observe<T>(&self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        match &result {
            Err(SessionError::Unauthorized) => {
                warn!("credentials rejected, signing out");
                self.sign_out.sign_out();
            }
            Err(SessionError::Superseded) => {
                debug!("discarding response for superseded session");
            }
            _ => {}
        }
        result
    }

    /// Moves to the previous chapter. Returns `false` if already at the first.
    pub fn go_to_previous(&self) -> bool {
        self.session().go_to_previous()
    }

    /// Moves to the next chapter. Returns `false` if already at the latest.
    pub fn go_to_next(&self) -> bool {
        self.session().go_to_next()
    }

    /// Returns `true` if the latest chapter is on display.
    pub fn is_at_latest(&self) -> bool {
        self.session().is_at_latest()
    }

    /// Closes the open story. Safe to call repeatedly.
    pub fn close(&self) {
        self.session().close();
    }

    /// Snapshot of what the reader should display.
    pub fn view(&self) -> SessionView {
        session_view(&self.session())
    }
}

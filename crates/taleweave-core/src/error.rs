//! Error types.

use thiserror::Error;

use crate::ids::StoryId;

/// Failures reported by a [`StoryService`](crate::service::StoryService)
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The story does not exist or is not visible to the caller.
    #[error("story not found")]
    NotFound,

    /// The credentials were rejected.
    #[error("credentials rejected by the story service")]
    Unauthorized,

    /// Chapter or story generation failed on the server.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// An advance is already being processed for the story.
    #[error("an advance is already in progress for this story")]
    Conflict,

    /// The request never produced a usable response (connect, timeout, status).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Errors surfaced by a reading session.
///
/// Every failure a session can observe is expressed here. None of them is
/// fatal to the application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The story does not exist or belongs to someone else.
    #[error("story {0} not found")]
    NotFound(StoryId),

    /// The credentials expired or were revoked.
    #[error("session expired, please sign in again")]
    Unauthorized,

    /// The next chapter could not be generated.
    #[error("the next chapter could not be written: {0}")]
    GenerationFailed(String),

    /// The server is already advancing this story.
    #[error("story {0} is already being advanced")]
    Conflict(StoryId),

    /// The server returned a chapter number that does not follow the latest one.
    #[error("chapter number {received} does not follow the latest chapter (expected {expected})")]
    IntegrityViolation {
        /// The number the next chapter should have had.
        expected: u32,
        /// The number the server returned.
        received: u32,
    },

    /// The story service could not be reached or answered nonsense.
    #[error("story service unavailable: {0}")]
    Unavailable(String),

    /// No story is loaded.
    #[error("no story is ready")]
    NotReady,

    /// Only the latest chapter can be advanced from.
    #[error("only the latest chapter can be continued")]
    NotAtLatest,

    /// The current chapter has no choices.
    #[error("this chapter has no choices")]
    NoChoices,

    /// An advance request is already pending for this session.
    #[error("the next chapter is already being written")]
    AdvanceInFlight,

    /// The response belongs to a session that has since been replaced or closed.
    #[error("response belongs to a superseded session")]
    Superseded,
}

impl SessionError {
    /// Translates a service failure observed while working on `story_id`.
    #[must_use]
    pub fn from_service(err: ServiceError, story_id: StoryId) -> Self {
        match err {
            ServiceError::NotFound => Self::NotFound(story_id),
            ServiceError::Unauthorized => Self::Unauthorized,
            ServiceError::GenerationFailed(message) => Self::GenerationFailed(message),
            ServiceError::Conflict => Self::Conflict(story_id),
            ServiceError::Transport(message) | ServiceError::Decode(message) => {
                Self::Unavailable(message)
            }
        }
    }

    /// Returns `true` if repeating the action the user just took may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::GenerationFailed(_) | Self::Unavailable(_) | Self::AdvanceInFlight
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failures_become_unavailable() {
        let story_id = StoryId(7);

        let err = SessionError::from_service(ServiceError::Transport("timed out".into()), story_id);

        assert_eq!(err, SessionError::Unavailable("timed out".into()));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_not_found_carries_story_id() {
        let err = SessionError::from_service(ServiceError::NotFound, StoryId(3));

        assert_eq!(err, SessionError::NotFound(StoryId(3)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_generation_failure_is_retryable() {
        let err = SessionError::from_service(
            ServiceError::GenerationFailed("model overloaded".into()),
            StoryId(1),
        );

        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "the next chapter could not be written: model overloaded"
        );
    }

    #[test]
    fn test_unauthorized_is_not_retryable() {
        let err = SessionError::from_service(ServiceError::Unauthorized, StoryId(1));
        assert_eq!(err, SessionError::Unauthorized);
        assert!(!err.is_retryable());
    }
}

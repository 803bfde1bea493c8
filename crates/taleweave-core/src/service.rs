//! Remote story service abstraction.

use async_trait::async_trait;

use crate::credentials::Credentials;
use crate::error::ServiceError;
use crate::ids::StoryId;
use crate::model::{Chapter, Choice, Story};

/// The backend that owns stories and generates chapters.
#[async_trait]
pub trait StoryService: Send + Sync {
    /// Fetches story metadata.
    async fn fetch_story(
        &self,
        credentials: &Credentials,
        story_id: StoryId,
    ) -> Result<Story, ServiceError>;

    /// Fetches every chapter of a story, ordered by chapter number.
    async fn fetch_chapters(
        &self,
        credentials: &Credentials,
        story_id: StoryId,
    ) -> Result<Vec<Chapter>, ServiceError>;

    /// Asks the server to generate the chapter following `choice`.
    ///
    /// The returned chapter has already been persisted server-side.
    async fn request_next_chapter(
        &self,
        credentials: &Credentials,
        story_id: StoryId,
        choice: Choice,
    ) -> Result<Chapter, ServiceError>;
}

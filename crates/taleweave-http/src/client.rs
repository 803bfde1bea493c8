//! `reqwest` implementation of [`StoryService`] plus the story listing and
//! creation calls the command line needs.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use taleweave_core::credentials::Credentials;
use taleweave_core::error::ServiceError;
use taleweave_core::ids::StoryId;
use taleweave_core::model::{Chapter, Choice, Story, StoryMode};
use taleweave_core::service::StoryService;
use tracing::{debug, warn};

use crate::config::{ClientConfig, ConfigError};
use crate::dto::{ChapterDto, ErrorBodyDto, NextChapterBody, PageDto, StoryDto};

/// One page of the caller's stories, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryPage {
    /// Stories on this page. Chapters are not loaded.
    pub stories: Vec<Story>,
    /// Zero-based page index.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
    /// Number of pages available.
    pub total_pages: u32,
    /// Number of stories across all pages.
    pub total_stories: u64,
    /// `true` if this is the final page.
    pub last: bool,
}

/// Parameters for generating a new story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    /// What the story should be about.
    pub prompt: String,
    /// Optional mood hint, e.g. `"brave"`.
    pub mood: Option<String>,
    /// Generation mode.
    pub mode: StoryMode,
}

/// Story service backed by the HTTP API.
#[derive(Debug, Clone)]
pub struct HttpStoryService {
    api_url: String,
    client: Client,
}

impl HttpStoryService {
    /// Builds a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Client` if the underlying client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|error| ConfigError::Client(error.to_string()))?;

        Ok(Self {
            api_url: config.api_url.clone(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.api_url.trim_end_matches('/');
        let suffix = path.trim_start_matches('/');
        format!("{base}/{suffix}")
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        credentials: &Credentials,
        generating: bool,
    ) -> Result<T, ServiceError> {
        let response = request
            .bearer_auth(credentials.token())
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "story API request failed");
                ServiceError::Transport(error.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| ServiceError::Transport(format!("response read failed: {error}")))?;

        if !status.is_success() {
            debug!(status = %status, "story API returned an error status");
            return Err(map_status(status, &body, generating));
        }

        serde_json::from_str(&body).map_err(|error| ServiceError::Decode(error.to_string()))
    }

    async fn send_empty(
        &self,
        request: RequestBuilder,
        credentials: &Credentials,
    ) -> Result<(), ServiceError> {
        let response = request
            .bearer_auth(credentials.token())
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "story API request failed");
                ServiceError::Transport(error.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response
            .text()
            .await
            .map_err(|error| ServiceError::Transport(format!("response read failed: {error}")))?;
        debug!(status = %status, "story API returned an error status");
        Err(map_status(status, &body, false))
    }

    /// Lists the caller's stories, newest first.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ServiceError`] if the request fails.
    pub async fn list_stories(
        &self,
        credentials: &Credentials,
        page: u32,
        size: u32,
    ) -> Result<StoryPage, ServiceError> {
        let request = self.client.get(self.endpoint("stories")).query(&[
            ("page", page.to_string()),
            ("size", size.to_string()),
            ("sortBy", "createdAt".to_owned()),
            ("direction", "DESC".to_owned()),
        ]);
        let dto: PageDto<StoryDto> = self.send_json(request, credentials, false).await?;

        Ok(StoryPage {
            stories: dto
                .content
                .into_iter()
                .map(|story| story.into_parts().0)
                .collect(),
            page: dto.number,
            size: dto.size,
            total_pages: dto.total_pages,
            total_stories: dto.total_elements,
            last: dto.last,
        })
    }

    /// Generates a new story. Interactive stories come back with their
    /// opening chapter.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::GenerationFailed` if the server could not
    /// generate the story, or another mapped error if the request failed.
    pub async fn create_story(
        &self,
        credentials: &Credentials,
        new_story: NewStory,
    ) -> Result<Story, ServiceError> {
        let (path, mode) = match new_story.mode {
            StoryMode::Interactive => ("stories/generate-interactive", "INTERACTIVE"),
            StoryMode::OneShot => ("stories/generate-one-shot", "ONE_SHOT"),
        };
        let mut form = Form::new()
            .text("prompt", new_story.prompt)
            .text("mode", mode);
        if let Some(mood) = new_story.mood {
            form = form.text("mood", mood);
        }

        let request = self.client.post(self.endpoint(path)).multipart(form);
        let dto: StoryDto = self.send_json(request, credentials, true).await?;
        Ok(dto.into_parts().0)
    }

    /// Deletes a story and its chapters.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the story does not exist or
    /// belongs to someone else, or another mapped error if the request
    /// failed.
    pub async fn delete_story(
        &self,
        credentials: &Credentials,
        story_id: StoryId,
    ) -> Result<(), ServiceError> {
        let request = self
            .client
            .delete(self.endpoint(&format!("stories/{story_id}")));
        self.send_empty(request, credentials).await
    }
}

#[async_trait]
impl StoryService for HttpStoryService {
    async fn fetch_story(
        &self,
        credentials: &Credentials,
        story_id: StoryId,
    ) -> Result<Story, ServiceError> {
        let request = self.client.get(self.endpoint(&format!("stories/{story_id}")));
        let dto: StoryDto = self.send_json(request, credentials, false).await?;
        Ok(dto.into_parts().0)
    }

    async fn fetch_chapters(
        &self,
        credentials: &Credentials,
        story_id: StoryId,
    ) -> Result<Vec<Chapter>, ServiceError> {
        let request = self
            .client
            .get(self.endpoint(&format!("stories/{story_id}/chapters")));
        let dtos: Vec<ChapterDto> = self.send_json(request, credentials, false).await?;
        Ok(dtos.into_iter().map(Chapter::from).collect())
    }

    async fn request_next_chapter(
        &self,
        credentials: &Credentials,
        story_id: StoryId,
        choice: Choice,
    ) -> Result<Chapter, ServiceError> {
        let request = self
            .client
            .post(self.endpoint(&format!("stories/{story_id}/chapters/next")))
            .json(&NextChapterBody {
                user_choice: choice,
            });
        let dto: ChapterDto = self.send_json(request, credentials, true).await?;
        Ok(dto.into())
    }
}

/// Maps a non-success status to a [`ServiceError`]. `generating` marks the
/// endpoints where a server error means generation failed.
fn map_status(status: StatusCode, body: &str, generating: bool) -> ServiceError {
    let message = serde_json::from_str::<ErrorBodyDto>(body)
        .ok()
        .and_then(|error| error.message)
        .unwrap_or_else(|| body.trim().to_owned());

    match status {
        StatusCode::UNAUTHORIZED => ServiceError::Unauthorized,
        StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => ServiceError::NotFound,
        StatusCode::CONFLICT => ServiceError::Conflict,
        status if status.is_server_error() && generating => {
            ServiceError::GenerationFailed(message)
        }
        status => ServiceError::Transport(format!("status {status}: {message}")),
    }
}

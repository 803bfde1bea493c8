//! Wire shapes of the story API and their conversion into the core model.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use taleweave_core::ids::{ChapterId, StoryId};
use taleweave_core::model::{Chapter, ChapterContent, Choice, ChoicePair, Story, StoryMode};

/// Accepts RFC 3339 timestamps and zone-less ones, which are taken as UTC.
fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentDto {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChapterDto {
    pub id: i64,
    pub chapter_number: u32,
    pub content: ContentDto,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub mood_tag: Option<String>,
    #[serde(default)]
    pub choices: Option<ChoicePair>,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl From<ChapterDto> for Chapter {
    fn from(dto: ChapterDto) -> Self {
        Self {
            id: ChapterId(dto.id),
            number: dto.chapter_number,
            content: ChapterContent {
                title: dto.content.title,
                text: dto.content.text,
            },
            image_url: dto.image_url,
            mood_tag: dto.mood_tag,
            choices: dto.choices,
            created_at: dto.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoryDto {
    pub id: i64,
    pub title: String,
    pub mode: StoryMode,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub chapters: Vec<ChapterDto>,
}

impl StoryDto {
    /// Splits the response into story metadata and its chapters in order.
    pub fn into_parts(self) -> (Story, Vec<Chapter>) {
        let mut chapters: Vec<Chapter> = self.chapters.into_iter().map(Chapter::from).collect();
        chapters.sort_by_key(|c| (c.number, c.id));
        let story = Story {
            id: StoryId(self.id),
            title: self.title,
            mode: self.mode,
            created_at: self.created_at,
            chapter_ids: chapters.iter().map(|c| c.id).collect(),
        };
        (story, chapters)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageDto<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_pages: u32,
    pub total_elements: u64,
    pub last: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NextChapterBody {
    pub user_choice: Choice,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBodyDto {
    pub message: Option<String>,
}

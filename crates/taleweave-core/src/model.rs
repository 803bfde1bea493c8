//! Story and chapter model as seen by the reader.
//!
//! Everything here is produced by the story service and treated as
//! immutable by the client. The only thing that changes over a session is
//! how many chapters a story has.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChapterId, StoryId};

/// Whether a story is generated in a single pass or chapter by chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoryMode {
    /// The whole story is generated at once and has no choices.
    OneShot,
    /// Each chapter may end in a choice that drives the next one.
    Interactive,
}

/// Story metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Story identifier.
    pub id: StoryId,
    /// Display title.
    pub title: String,
    /// Branching mode.
    pub mode: StoryMode,
    /// When the story was created.
    pub created_at: DateTime<Utc>,
    /// Chapter identifiers in server order.
    pub chapter_ids: Vec<ChapterId>,
}

/// One of the two branches a chapter can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    /// The first option.
    A,
    /// The second option.
    B,
}

impl Choice {
    /// Returns the wire tag for this choice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Choice`] from text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown choice {0:?}, expected A or B")]
pub struct ParseChoiceError(pub String);

impl FromStr for Choice {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            other => Err(ParseChoiceError(other.to_owned())),
        }
    }
}

/// The labelled pair of options closing a non-terminal chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoicePair {
    /// Label for option A.
    #[serde(rename = "A")]
    pub a: String,
    /// Label for option B.
    #[serde(rename = "B")]
    pub b: String,
}

impl ChoicePair {
    /// Returns the label for `choice`.
    #[must_use]
    pub fn label(&self, choice: Choice) -> &str {
        match choice {
            Choice::A => &self.a,
            Choice::B => &self.b,
        }
    }
}

/// Chapter text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterContent {
    /// Chapter heading.
    pub title: String,
    /// Body text.
    pub text: String,
}

/// One generated chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter identifier.
    pub id: ChapterId,
    /// 1-based position assigned by the server, strictly increasing within a story.
    pub number: u32,
    /// Title and body.
    pub content: ChapterContent,
    /// Illustration, if one was generated.
    pub image_url: Option<String>,
    /// Mood the chapter was generated with.
    pub mood_tag: Option<String>,
    /// Options for the next chapter. `None` marks the end of the story.
    pub choices: Option<ChoicePair>,
    /// When the chapter was created.
    pub created_at: DateTime<Utc>,
}

impl Chapter {
    /// Returns `true` if the chapter offers no way forward.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.choices.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_parses_either_case() {
        assert_eq!("a".parse::<Choice>().unwrap(), Choice::A);
        assert_eq!(" B ".parse::<Choice>().unwrap(), Choice::B);
    }

    #[test]
    fn test_choice_rejects_unknown_tag() {
        let err = "c".parse::<Choice>().unwrap_err();
        assert_eq!(err, ParseChoiceError("c".into()));
    }

    #[test]
    fn test_choice_pair_serializes_with_wire_tags() {
        let pair = ChoicePair {
            a: "Follow the fox".into(),
            b: "Climb the tree".into(),
        };

        let json = serde_json::to_value(&pair).unwrap();

        assert_eq!(json["A"], "Follow the fox");
        assert_eq!(json["B"], "Climb the tree");
        assert_eq!(pair.label(Choice::B), "Climb the tree");
    }

    #[test]
    fn test_story_mode_uses_screaming_snake_case() {
        let mode: StoryMode = serde_json::from_str("\"ONE_SHOT\"").unwrap();
        assert_eq!(mode, StoryMode::OneShot);
    }
}

//! Plain-text rendering of sessions and story listings.

use std::fmt::Write as _;

use taleweave_core::model::{Choice, StoryMode};
use taleweave_http::client::StoryPage;
use taleweave_reader::application::query_handlers::{DisplayState, SessionView};

/// Shown under a chapter that ends the story.
pub const THE_END: &str = "The End (for now!)";

/// Renders the screen for `view`.
#[must_use]
pub fn render_view(view: &SessionView) -> String {
    let mut out = String::new();
    let title = view.title.as_deref().unwrap_or("Untitled story");

    match view.state {
        DisplayState::Idle => out.push_str("No story is open.\n"),
        DisplayState::Loading => out.push_str("Loading story...\n"),
        DisplayState::NotFound => out.push_str("That story does not exist.\n"),
        DisplayState::SignedOut => out.push_str("You have been signed out.\n"),
        DisplayState::Unavailable => {
            out.push_str("The story could not be loaded.");
            if let Some(error) = &view.error {
                let _ = write!(out, " ({error})");
            }
            out.push_str(" Press r to try again.\n");
        }
        DisplayState::Empty => {
            let _ = writeln!(out, "== {title} ==");
            out.push_str("This story has no chapters yet. Press r to refresh.\n");
        }
        DisplayState::Reading | DisplayState::TheEnd => {
            let _ = writeln!(out, "== {title} ==");
            if let Some(chapter) = &view.chapter {
                let _ = writeln!(
                    out,
                    "Chapter {} of {}: {}",
                    view.position, view.total, chapter.title
                );
                if let Some(url) = &chapter.image_url {
                    let _ = writeln!(out, "[illustration: {url}]");
                }
                let _ = writeln!(out, "\n{}\n", chapter.text);
            }
            if view.state == DisplayState::TheEnd {
                let _ = writeln!(out, "{THE_END}");
            } else if let Some(choices) = &view.choices {
                for choice in [Choice::A, Choice::B] {
                    let _ = writeln!(out, "  {choice}) {}", choices.label(choice));
                }
            } else if view.can_go_forward {
                out.push_str("(Go to the latest chapter to choose what happens next.)\n");
            }
        }
    }
    out
}

/// Renders the keys available in `view`.
#[must_use]
pub fn render_prompt(view: &SessionView) -> String {
    let mut keys = Vec::new();
    if view.can_go_back {
        keys.push("p: previous");
    }
    if view.can_go_forward {
        keys.push("n: next");
    }
    if view.choices.is_some() {
        keys.push("a/b: choose");
    }
    keys.push("r: refresh");
    keys.push("q: quit");
    format!("[{}] > ", keys.join(", "))
}

/// Renders one page of the story list.
#[must_use]
pub fn render_story_page(page: &StoryPage) -> String {
    if page.stories.is_empty() {
        return "No stories yet. Create one with `taleweave new --prompt ...`.\n".to_owned();
    }

    let mut out = String::new();
    for story in &page.stories {
        let mode = match story.mode {
            StoryMode::Interactive => "interactive",
            StoryMode::OneShot => "one-shot",
        };
        let _ = writeln!(
            out,
            "{:>6}  {}  {} ({mode}, {})",
            story.id,
            story.created_at.format("%Y-%m-%d"),
            story.title,
            chapter_count(story.chapter_ids.len()),
        );
    }
    let _ = writeln!(
        out,
        "Page {} of {} ({} total)",
        page.page + 1,
        page.total_pages.max(1),
        page.total_stories
    );
    out
}

fn chapter_count(count: usize) -> String {
    if count == 1 {
        "1 chapter".to_owned()
    } else {
        format!("{count} chapters")
    }
}

//! Shared test doubles and fixtures for the Taleweave reader.

mod clock;
mod fixtures;
mod service;
mod sign_out;

pub use clock::StepClock;
pub use fixtures::{chapter, chapter_with_choices, fixed_now, story};
pub use service::{ScriptedStoryService, ServiceCall};
pub use sign_out::RecordingSignOut;

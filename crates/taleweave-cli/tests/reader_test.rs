//! Drives the reading loop with scripted input against a scripted service.

use std::sync::Arc;

use taleweave_cli::reader::{ReaderExit, run_reader};
use taleweave_cli::render::THE_END;
use taleweave_core::credentials::Credentials;
use taleweave_core::error::ServiceError;
use taleweave_core::ids::StoryId;
use taleweave_core::model::Choice;
use taleweave_reader::application::controller::SessionController;
use taleweave_reader::cache::InMemorySessionCache;
use taleweave_test_support::{
    RecordingSignOut, ScriptedStoryService, ServiceCall, StepClock, chapter, chapter_with_choices,
    story,
};

struct Reader {
    controller: SessionController,
    service: Arc<ScriptedStoryService>,
    sign_out: Arc<RecordingSignOut>,
}

fn reader(service: ScriptedStoryService) -> Reader {
    let service = Arc::new(service);
    let sign_out = Arc::new(RecordingSignOut::new());
    let controller = SessionController::new(
        service.clone(),
        Arc::new(InMemorySessionCache::new()),
        sign_out.clone(),
        Arc::new(StepClock::default()),
        Credentials::bearer("test-token"),
    );
    Reader {
        controller,
        service,
        sign_out,
    }
}

fn two_chapter_service() -> ScriptedStoryService {
    ScriptedStoryService::new().with_story(
        story(1, &[10, 11]),
        vec![chapter_with_choices(10, 1), chapter_with_choices(11, 2)],
    )
}

async fn run(reader: &Reader, story_id: i64, input: &str) -> (ReaderExit, String) {
    let mut out = Vec::new();
    let exit = run_reader(
        &reader.controller,
        StoryId(story_id),
        input.as_bytes(),
        &mut out,
    )
    .await
    .unwrap();
    (exit, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_reader_opens_on_latest_chapter_and_navigates_back() {
    // Arrange
    let reader = reader(two_chapter_service());

    // Act
    let (exit, output) = run(&reader, 1, "p\nq\n").await;

    // Assert
    assert_eq!(exit, ReaderExit::Quit);
    let latest = output.find("Chapter 2 of 2").unwrap();
    let previous = output.find("Chapter 1 of 2").unwrap();
    assert!(latest < previous);
    assert!(output.contains("Go to the latest chapter"));
}

#[tokio::test]
async fn test_choosing_appends_chapter_and_reaches_the_end() {
    let reader = reader(two_chapter_service());
    reader.service.push_next_chapter(Ok(chapter(12, 3)));

    let (_, output) = run(&reader, 1, "a\nq\n").await;

    assert!(output.contains("Chapter 3 of 3"));
    assert!(output.contains(THE_END));
    assert!(
        reader
            .service
            .calls()
            .contains(&ServiceCall::NextChapter(StoryId(1), Choice::A))
    );
}

#[tokio::test]
async fn test_choice_on_earlier_chapter_is_refused_without_request() {
    let reader = reader(two_chapter_service());

    let (_, output) = run(&reader, 1, "p\nb\nq\n").await;

    assert!(output.contains("only the latest chapter can be continued"));
    assert_eq!(reader.service.next_chapter_calls(), 0);
}

#[tokio::test]
async fn test_generation_failure_can_be_retried() {
    let reader = reader(two_chapter_service());
    reader
        .service
        .push_next_chapter(Err(ServiceError::GenerationFailed("model overloaded".into())));
    reader.service.push_next_chapter(Ok(chapter_with_choices(12, 3)));

    let (_, output) = run(&reader, 1, "a\na\nq\n").await;

    assert!(output.contains("model overloaded. You can try again."));
    assert!(output.contains("Chapter 3 of 3"));
    assert_eq!(reader.service.next_chapter_calls(), 2);
}

#[tokio::test]
async fn test_missing_story_ends_reader() {
    let reader = reader(ScriptedStoryService::new());

    let (exit, output) = run(&reader, 99, "q\n").await;

    assert_eq!(exit, ReaderExit::NotFound);
    assert!(output.contains("That story does not exist."));
}

#[tokio::test]
async fn test_rejected_token_signs_out() {
    let reader = reader(
        ScriptedStoryService::new().with_failure(StoryId(1), ServiceError::Unauthorized),
    );

    let (exit, _) = run(&reader, 1, "").await;

    assert_eq!(exit, ReaderExit::SignedOut);
    assert_eq!(reader.sign_out.count(), 1);
}

#[tokio::test]
async fn test_unknown_command_is_reported_and_end_of_input_quits() {
    let reader = reader(two_chapter_service());

    let (exit, output) = run(&reader, 1, "x\n").await;

    assert_eq!(exit, ReaderExit::Quit);
    assert!(output.contains("Unknown command \"x\"."));
}

#[tokio::test]
async fn test_refresh_after_failed_open_retries_the_open() {
    let reader = reader(
        ScriptedStoryService::new()
            .with_failure(StoryId(1), ServiceError::Transport("connection refused".into())),
    );

    let (_, output) = run(&reader, 1, "r\nq\n").await;

    assert!(output.contains("Press r to try again"));
    let story_fetches = reader
        .service
        .calls()
        .iter()
        .filter(|call| matches!(call, ServiceCall::FetchStory(_)))
        .count();
    assert_eq!(story_fetches, 2);
}

//! The interactive reading loop.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use taleweave_core::credentials::SignOut;
use taleweave_core::error::SessionError;
use taleweave_core::ids::StoryId;
use taleweave_core::model::Choice;
use taleweave_reader::application::controller::SessionController;
use taleweave_reader::application::query_handlers::DisplayState;
use taleweave_reader::domain::session::AdvanceOutcome;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::render::{render_prompt, render_view};

/// A reader keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show the previous chapter.
    Previous,
    /// Show the next chapter.
    Next,
    /// Continue the story with a branch.
    Choose(Choice),
    /// Re-fetch the chapters.
    Refresh,
    /// Leave the reader.
    Quit,
}

/// Parses one input line. Returns `None` for anything unrecognised.
#[must_use]
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "prev" | "previous" => Some(Command::Previous),
        "n" | "next" => Some(Command::Next),
        "a" => Some(Command::Choose(Choice::A)),
        "b" => Some(Command::Choose(Choice::B)),
        "r" | "refresh" => Some(Command::Refresh),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Returns `true` if a yes/no answer means yes.
#[must_use]
pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Why the reading loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    /// The reader quit or input ended.
    Quit,
    /// The story does not exist.
    NotFound,
    /// The credentials were rejected.
    SignedOut,
}

/// Sign-out hook for the terminal: remembers that the token was rejected so
/// the process can stop using it.
#[derive(Debug, Default)]
pub struct TerminalSignOut {
    signed_out: AtomicBool,
}

impl TerminalSignOut {
    /// Creates a hook that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once the token has been rejected.
    pub fn is_signed_out(&self) -> bool {
        self.signed_out.load(Ordering::SeqCst)
    }
}

impl SignOut for TerminalSignOut {
    fn sign_out(&self) {
        warn!("story service rejected the token");
        self.signed_out.store(true, Ordering::SeqCst);
    }
}

/// Opens `story_id` and reads commands from `input` until the reader quits.
///
/// # Errors
///
/// Returns `AppError::Io` if reading input or writing output fails.
/// Session failures are reported to the reader and do not end the loop.
pub async fn run_reader<R, W>(
    controller: &SessionController,
    story_id: StoryId,
    input: R,
    out: &mut W,
) -> Result<ReaderExit, AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if let Err(err) = controller.open(story_id).await {
        debug!(story_id = %story_id, error = %err, "open failed, showing it in the view");
    }
    let mut lines = input.lines();

    loop {
        let view = controller.view();
        write!(out, "{}", render_view(&view))?;
        match view.state {
            DisplayState::NotFound => return Ok(ReaderExit::NotFound),
            DisplayState::SignedOut => return Ok(ReaderExit::SignedOut),
            _ => {}
        }
        write!(out, "{}", render_prompt(&view))?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            controller.close();
            return Ok(ReaderExit::Quit);
        };
        writeln!(out)?;

        let Some(command) = parse_command(&line) else {
            writeln!(out, "Unknown command {:?}.", line.trim())?;
            continue;
        };

        match command {
            Command::Quit => {
                controller.close();
                return Ok(ReaderExit::Quit);
            }
            Command::Previous => {
                if !controller.go_to_previous() {
                    writeln!(out, "This is the first chapter.")?;
                }
            }
            Command::Next => {
                if !controller.go_to_next() {
                    writeln!(out, "This is the latest chapter.")?;
                }
            }
            Command::Choose(choice) => {
                writeln!(out, "Writing what happens after choice {choice}...")?;
                match controller.advance(choice).await {
                    Ok(AdvanceOutcome::Suppressed) => writeln!(
                        out,
                        "The story is already being continued. Refresh in a moment."
                    )?,
                    Ok(_) => {}
                    Err(err) => report(out, &err)?,
                }
            }
            Command::Refresh => {
                let result = if view.state == DisplayState::Unavailable {
                    controller.open(story_id).await
                } else {
                    controller.refresh().await
                };
                if let Err(err) = result {
                    report(out, &err)?;
                }
            }
        }
    }
}

fn report<W: Write>(out: &mut W, err: &SessionError) -> std::io::Result<()> {
    match err {
        SessionError::Superseded => Ok(()),
        err if err.is_retryable() => writeln!(out, "{err}. You can try again."),
        err => writeln!(out, "{err}."),
    }
}

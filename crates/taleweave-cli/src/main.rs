//! `taleweave` command line entry point.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use taleweave_cli::error::AppError;
use taleweave_cli::reader::{ReaderExit, TerminalSignOut, is_confirmation, run_reader};
use taleweave_cli::render::render_story_page;
use taleweave_core::clock::SystemClock;
use taleweave_core::credentials::Credentials;
use taleweave_core::ids::StoryId;
use taleweave_core::model::StoryMode;
use taleweave_http::client::{HttpStoryService, NewStory};
use taleweave_http::config::ClientConfig;
use taleweave_reader::application::controller::SessionController;
use taleweave_reader::cache::InMemorySessionCache;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

const SIGNED_OUT_MESSAGE: &str =
    "You have been signed out. Set TALEWEAVE_API_TOKEN to a fresh token and try again.";

/// Read and continue branching stories.
#[derive(Debug, Parser)]
#[command(name = "taleweave", version, about)]
struct Cli {
    /// API root, overriding TALEWEAVE_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List your stories, newest first.
    List {
        /// Zero-based page index.
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// Stories per page.
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    /// Generate a new story. Interactive stories open in the reader.
    New {
        /// What the story should be about.
        #[arg(long)]
        prompt: String,
        /// Mood hint, e.g. "brave".
        #[arg(long)]
        mood: Option<String>,
        /// Generate the whole story at once, without choices.
        #[arg(long)]
        one_shot: bool,
    },
    /// Delete a story and its chapters.
    Delete {
        /// Story identifier.
        story_id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Read a story.
    Read {
        /// Story identifier.
        story_id: i64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if std::env::var("TALEWEAVE_LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, AppError> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    tracing::debug!(api_url = %config.api_url, "story API configured");

    let credentials = config.credentials()?;
    let service = Arc::new(HttpStoryService::new(&config)?);
    let sign_out = Arc::new(TerminalSignOut::new());
    let controller = SessionController::new(
        service.clone(),
        Arc::new(InMemorySessionCache::new()),
        sign_out.clone(),
        Arc::new(SystemClock),
        credentials.clone(),
    );

    let mut stdout = io::stdout();
    let result = match cli.command {
        Command::List { page, size } => service
            .list_stories(&credentials, page, size)
            .await
            .map_err(AppError::from)
            .and_then(|listing| {
                write!(stdout, "{}", render_story_page(&listing))?;
                Ok(ExitCode::SUCCESS)
            }),
        Command::New {
            prompt,
            mood,
            one_shot,
        } => {
            let mode = if one_shot {
                StoryMode::OneShot
            } else {
                StoryMode::Interactive
            };
            eprintln!("Writing your story, this can take a minute...");
            match service
                .create_story(&credentials, NewStory { prompt, mood, mode })
                .await
            {
                Ok(story) => {
                    writeln!(stdout, "Created story {}: {}", story.id, story.title)?;
                    read(&controller, story.id, &mut stdout).await
                }
                Err(err) => Err(err.into()),
            }
        }
        Command::Delete { story_id, yes } => {
            delete(&service, &credentials, StoryId(story_id), yes, &mut stdout).await
        }
        Command::Read { story_id } => read(&controller, StoryId(story_id), &mut stdout).await,
    };

    match result {
        Err(err) if err.is_unauthorized() => {
            eprintln!("{SIGNED_OUT_MESSAGE}");
            Ok(ExitCode::from(2))
        }
        Ok(_) if sign_out.is_signed_out() => {
            eprintln!("{SIGNED_OUT_MESSAGE}");
            Ok(ExitCode::from(2))
        }
        other => other,
    }
}

async fn delete(
    service: &HttpStoryService,
    credentials: &Credentials,
    story_id: StoryId,
    yes: bool,
    stdout: &mut io::Stdout,
) -> Result<ExitCode, AppError> {
    if !yes {
        write!(stdout, "Delete story {story_id}? [y/N] ")?;
        stdout.flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if !is_confirmation(&answer) {
            writeln!(stdout, "Kept story {story_id}.")?;
            return Ok(ExitCode::SUCCESS);
        }
    }

    service.delete_story(credentials, story_id).await?;
    tracing::info!(story_id = %story_id, "story deleted");
    writeln!(stdout, "Deleted story {story_id}.")?;
    Ok(ExitCode::SUCCESS)
}

async fn read(
    controller: &SessionController,
    story_id: StoryId,
    stdout: &mut io::Stdout,
) -> Result<ExitCode, AppError> {
    let stdin = BufReader::new(tokio::io::stdin());
    match run_reader(controller, story_id, stdin, stdout).await? {
        ReaderExit::Quit | ReaderExit::SignedOut => Ok(ExitCode::SUCCESS),
        ReaderExit::NotFound => Ok(ExitCode::FAILURE),
    }
}

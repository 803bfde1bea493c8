//! In-process fake of the story API for adapter tests.

use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use taleweave_core::credentials::Credentials;
use taleweave_http::client::HttpStoryService;
use taleweave_http::config::ClientConfig;

pub const GOOD_TOKEN: &str = "good-token";

/// Story that exists and has two chapters.
pub const KNOWN_STORY: i64 = 1;
/// Story owned by someone else.
pub const FORBIDDEN_STORY: i64 = 3;
/// Story whose advance is already being processed.
pub const BUSY_STORY: i64 = 9;
/// Story whose endpoints answer slower than the test timeout.
pub const SLOW_STORY: i64 = 5;

pub fn good_credentials() -> Credentials {
    Credentials::bearer(GOOD_TOKEN)
}

fn chapter_json(id: i64, number: u32, choices: Option<(&str, &str)>) -> Value {
    json!({
        "id": id,
        "chapterNumber": number,
        "content": { "title": format!("Chapter {number}"), "text": format!("Text {number}.") },
        "imageUrl": null,
        "moodTag": "calm",
        "choices": choices.map(|(a, b)| json!({ "A": a, "B": b })),
        "createdAt": "2026-01-15T10:00:00"
    })
}

fn story_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "status": "PUBLISHED",
        "mode": "INTERACTIVE",
        "createdAt": "2026-01-15T10:00:00Z",
        "chapters": [
            chapter_json(11, 2, Some(("Climb", "Swim"))),
            chapter_json(10, 1, Some(("Left", "Right"))),
        ]
    })
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "status": status.as_u16(), "message": message }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {GOOD_TOKEN}"))
}

/// Resolves the common outcomes shared by the per-story endpoints.
async fn gate(headers: &HeaderMap, id: i64) -> Option<Response> {
    if !authorized(headers) {
        return Some(error(StatusCode::UNAUTHORIZED, "unauthorized"));
    }
    match id {
        KNOWN_STORY | BUSY_STORY => None,
        SLOW_STORY => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            None
        }
        FORBIDDEN_STORY => Some(error(StatusCode::FORBIDDEN, "forbidden")),
        _ => Some(error(StatusCode::NOT_FOUND, "story not found")),
    }
}

async fn get_story(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Some(response) = gate(&headers, id).await {
        return response;
    }
    Json(story_json(id, "The Fox")).into_response()
}

async fn get_chapters(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Some(response) = gate(&headers, id).await {
        return response;
    }
    Json(json!([
        chapter_json(10, 1, Some(("Left", "Right"))),
        chapter_json(11, 2, Some(("Climb", "Swim"))),
    ]))
    .into_response()
}

async fn delete_story(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Some(response) = gate(&headers, id).await {
        return response;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn next_chapter(headers: HeaderMap, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    if let Some(response) = gate(&headers, id).await {
        return response;
    }
    if id == BUSY_STORY {
        return error(StatusCode::CONFLICT, "already generating");
    }
    match body.get("userChoice").and_then(Value::as_str) {
        Some("A") => Json(chapter_json(12, 3, None)).into_response(),
        Some("B") => error(StatusCode::INTERNAL_SERVER_ERROR, "model overloaded"),
        _ => error(StatusCode::BAD_REQUEST, "userChoice is required"),
    }
}

async fn list_stories(headers: HeaderMap, Query(params): Query<Vec<(String, String)>>) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "unauthorized");
    }
    let param = |name: &str| {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };
    if param("sortBy").as_deref() != Some("createdAt") || param("direction").as_deref() != Some("DESC") {
        return error(StatusCode::BAD_REQUEST, "unsupported sort");
    }
    let number: u32 = param("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let size: u32 = param("size").and_then(|s| s.parse().ok()).unwrap_or(10);
    Json(json!({
        "content": [story_json(2, "Newer"), story_json(KNOWN_STORY, "The Fox")],
        "number": number,
        "size": size,
        "totalPages": 3,
        "totalElements": 25,
        "last": false
    }))
    .into_response()
}

async fn generate_interactive(headers: HeaderMap, body: String) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "unauthorized");
    }
    if !body.contains("name=\"prompt\"") || !body.contains("INTERACTIVE") {
        return error(StatusCode::BAD_REQUEST, "prompt and mode are required");
    }
    if body.contains("fail please") {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "generation failed");
    }
    let title = if body.contains("name=\"mood\"") { "Moody" } else { "Plain" };
    Json(story_json(42, title)).into_response()
}

/// Starts the fake API and returns its base URL, including `/api/v1`.
pub async fn spawn_fake_api() -> String {
    let api = Router::new()
        .route("/stories", get(list_stories))
        .route("/stories/generate-interactive", post(generate_interactive))
        .route("/stories/{id}", get(get_story).delete(delete_story))
        .route("/stories/{id}/chapters", get(get_chapters))
        .route("/stories/{id}/chapters/next", post(next_chapter));
    let app = Router::new().nest("/api/v1", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}/api/v1")
}

pub fn service_for(api_url: String) -> HttpStoryService {
    HttpStoryService::new(&ClientConfig {
        api_url,
        timeout: Duration::from_millis(500),
        token: None,
    })
    .unwrap()
}

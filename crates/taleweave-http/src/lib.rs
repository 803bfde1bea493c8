//! HTTP client for the Taleweave story API.
//!
//! [`client::HttpStoryService`] implements the reader's `StoryService` over
//! the REST API and adds the catalogue calls the terminal front end needs.

pub mod client;
pub mod config;
mod dto;

//! Async orchestration of reading sessions and read-only views.

pub mod controller;
pub mod query_handlers;

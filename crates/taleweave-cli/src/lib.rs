//! Terminal front end for reading Taleweave stories.

pub mod error;
pub mod reader;
pub mod render;

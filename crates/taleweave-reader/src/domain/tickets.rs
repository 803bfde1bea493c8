//! Tickets handed out when a session issues a remote request.
//!
//! A ticket must be presented when the response is applied. Tickets minted
//! under a session that has since been replaced or closed are rejected, so a
//! late response can never touch the state of a newer session.

use taleweave_core::ids::{SessionId, StoryId};
use taleweave_core::model::Choice;

/// Issued for a full load of the chapter sequence (open or refresh).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    /// Session the request was issued under.
    pub session_id: SessionId,
    /// Story being loaded.
    pub story_id: StoryId,
}

/// Issued for a chapter generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceTicket {
    /// Session the request was issued under.
    pub session_id: SessionId,
    /// Story being advanced.
    pub story_id: StoryId,
    /// Branch the reader picked.
    pub choice: Choice,
    /// Number of the latest chapter when the request was issued. A valid
    /// response is always numbered above it.
    pub latest_number: u32,
}

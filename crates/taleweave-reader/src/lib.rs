//! Branching story reader.
//!
//! Presents one story as a navigable, append-only sequence of chapters and
//! drives chapter generation against the story service. The domain layer is
//! a synchronous state machine; the application layer runs it against the
//! asynchronous collaborators.

pub mod application;
pub mod cache;
pub mod domain;

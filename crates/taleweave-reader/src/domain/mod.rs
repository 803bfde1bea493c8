//! Reading session state machine.

pub mod session;
pub mod tickets;

//! Shared story model and collaborator abstractions.
//!
//! This crate defines the types and traits the reader and its adapters
//! depend on. It contains no infrastructure code.

pub mod cache;
pub mod clock;
pub mod credentials;
pub mod error;
pub mod ids;
pub mod model;
pub mod sequence;
pub mod service;

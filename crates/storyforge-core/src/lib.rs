//! Story Forge Core — shared domain abstractions.
//!
//! Every bounded context (template catalog, story state, story sessions)
//! builds on the traits defined here. Nothing in this crate performs I/O.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;

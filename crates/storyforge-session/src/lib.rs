//! Story Forge — Story Session bounded context.
//!
//! Responsible for one story at a time: seeding it from a template, walking
//! the setup wizard, board edits, and merging patches from the storytelling
//! agent. Every change is an event on the session's stream.

pub mod application;
pub mod domain;

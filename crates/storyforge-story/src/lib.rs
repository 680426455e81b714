//! Story Forge — Story State bounded context.
//!
//! Owns the record shared between the setup UI and the storytelling agent:
//! its schema and defaults, the sparse patch format the agent speaks, the
//! single merge primitive every mutation goes through, and the story board
//! projection.

pub mod domain;

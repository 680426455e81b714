//! Story Forge event store.
//!
//! Story sessions live for the lifetime of the server process; durable
//! storage of story state belongs to the agent's own memory store.

pub mod memory_event_repository;

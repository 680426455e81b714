//! Application layer for the Story Session context.

pub mod command_handlers;
pub mod query_handlers;

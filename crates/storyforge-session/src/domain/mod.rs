//! Domain model for the Story Session context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod wizard;

//! Domain model for the Story State context.

pub mod board;
pub mod patch;
pub mod state;

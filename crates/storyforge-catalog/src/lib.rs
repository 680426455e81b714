//! Story Forge — Template Catalog bounded context.
//!
//! Responsible for the fixed set of genre templates a story can be seeded
//! from: loading and checking the embedded catalog, id lookup, the option
//! pools offered by the setup wizard, and genre prompts.

pub mod application;
pub mod domain;

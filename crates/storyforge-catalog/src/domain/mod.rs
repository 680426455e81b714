//! Domain model for the Template Catalog context.

pub mod catalog;
pub mod prompts;
pub mod templates;

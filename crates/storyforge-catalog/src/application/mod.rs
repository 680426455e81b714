//! Application layer for the Template Catalog context.

pub mod query_handlers;

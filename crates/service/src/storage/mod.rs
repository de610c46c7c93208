//! Storage backends for the service layer that do not need a database.
//!
//! `project_store` keeps each project's issue list behind its own lock and
//! optionally persists it as a JSON file.

pub mod project_store;

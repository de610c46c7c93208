//! Issue store: domain, filtering, repository seam and service layer.
//!
//! `IssueService` validates requests and delegates persistence to an
//! `IssueRepository`; `repo::seaorm` and `storage::project_store` provide the
//! Postgres and file-backed implementations.

pub mod domain;
pub mod filter;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::IssueService;

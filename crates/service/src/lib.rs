//! Service layer for the issue tracker.
//! - Separates business rules (validation, filtering, partial updates) from data access.
//! - Reuses entity definitions from the `models` crate for the Postgres backend.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod issues;
pub mod runtime;
pub mod storage;
#[cfg(test)]
pub mod test_support;

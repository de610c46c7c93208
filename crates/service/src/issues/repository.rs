use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{Issue, IssuePatch};
use super::filter::IssueFilter;
use crate::errors::ServiceError;

/// Persistence seam for projects and their ordered issue lists.
///
/// Implementations guarantee that mutations on one project are atomic with
/// respect to each other, that readers never observe a half-written issue,
/// and that different projects never wait on each other.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Issues of `project` matching `filter`, in insertion order.
    /// Fails with `ProjectNotFound` when the project was never created.
    async fn list(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>, ServiceError>;

    /// Append `issue`, creating the project first if it does not exist.
    async fn create(&self, project: &str, issue: Issue) -> Result<Issue, ServiceError>;

    /// Apply `patch` to issue `id`; `Ok(false)` when project or issue is absent.
    async fn update(&self, project: &str, id: Uuid, patch: &IssuePatch) -> Result<bool, ServiceError>;

    /// Remove issue `id`; `Ok(false)` when project or issue is absent.
    async fn delete(&self, project: &str, id: Uuid) -> Result<bool, ServiceError>;
}

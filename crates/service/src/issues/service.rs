use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{DeleteIssueInput, Issue, IssuePatch, NewIssueInput, UpdateIssueInput};
use super::filter::IssueFilter;
use super::repository::IssueRepository;
use crate::errors::ServiceError;

/// Issue business rules independent of web framework and storage.
///
/// All validation happens here, before the repository is touched, so a
/// rejected request never mutates anything.
#[derive(Clone)]
pub struct IssueService {
    repo: Arc<dyn IssueRepository>,
}

impl IssueService {
    pub fn new(repo: Arc<dyn IssueRepository>) -> Self { Self { repo } }

    /// List a project's issues. Reading never creates a project.
    #[instrument(skip(self, filter), fields(project = %project))]
    pub async fn list(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>, ServiceError> {
        let issues = self.repo.list(project, filter).await?;
        info!(count = issues.len(), filtered = !filter.is_empty(), "issues_listed");
        Ok(issues)
    }

    /// Create an issue, provisioning the project on first use.
    #[instrument(skip(self, input), fields(project = %project))]
    pub async fn create(&self, project: &str, input: NewIssueInput) -> Result<Issue, ServiceError> {
        let issue = input.validate()?.into_issue();
        let created = self.repo.create(project, issue).await?;
        info!(issue_id = %created.id, "issue_created");
        Ok(created)
    }

    /// Apply a partial update; returns the id of the updated issue.
    #[instrument(skip(self, input), fields(project = %project))]
    pub async fn update(&self, project: &str, input: UpdateIssueInput) -> Result<Uuid, ServiceError> {
        let raw_id = input.id.ok_or(ServiceError::MissingId)?;

        let close = match &input.open {
            Some(flag) if flag.is_close() => true,
            Some(flag) if flag.is_reopen() => {
                warn!(issue_id = %raw_id, "reopen requested; issues can only be closed, ignoring");
                false
            }
            Some(flag) => {
                warn!(issue_id = %raw_id, value = ?flag, "unrecognised open value ignored");
                false
            }
            None => false,
        };
        let patch = IssuePatch {
            title: input.title,
            text: input.text,
            created_by: input.created_by,
            assigned_to: input.assigned_to,
            status_text: input.status_text,
            close,
        };
        if patch.is_empty() {
            return Err(ServiceError::NoUpdateFields { id: raw_id });
        }

        let Ok(id) = Uuid::parse_str(&raw_id) else {
            return Err(ServiceError::UpdateFailed { id: raw_id });
        };
        if !self.repo.update(project, id, &patch).await? {
            return Err(ServiceError::UpdateFailed { id: raw_id });
        }
        info!(issue_id = %id, closed = patch.close, "issue_updated");
        Ok(id)
    }

    /// Delete an issue; returns its id.
    #[instrument(skip(self, input), fields(project = %project))]
    pub async fn delete(&self, project: &str, input: DeleteIssueInput) -> Result<Uuid, ServiceError> {
        let raw_id = input.id.ok_or(ServiceError::MissingId)?;
        let Ok(id) = Uuid::parse_str(&raw_id) else {
            return Err(ServiceError::DeleteFailed { id: raw_id });
        };
        if !self.repo.delete(project, id).await? {
            return Err(ServiceError::DeleteFailed { id: raw_id });
        }
        info!(issue_id = %id, "issue_deleted");
        Ok(id)
    }
}

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use models::{issue, project};

use crate::errors::ServiceError;
use crate::issues::domain::{Issue, IssuePatch};
use crate::issues::filter::{DateMatch, IssueFilter};
use crate::issues::repository::IssueRepository;

/// Postgres-backed repository. Every mutation runs in its own transaction
/// holding the project row lock, which serialises writers per project only.
pub struct SeaOrmIssueRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmIssueRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_issue(m: issue::Model) -> Issue {
    Issue {
        id: m.id,
        title: m.issue_title,
        text: m.issue_text,
        created_by: m.created_by,
        assigned_to: m.assigned_to,
        status_text: m.status_text,
        created_on: m.created_on.with_timezone(&Utc),
        updated_on: m.updated_on.with_timezone(&Utc),
        open: m.open,
    }
}

/// Translate the filter into a SQL condition over the `issue` table.
fn condition(filter: &IssueFilter) -> Condition {
    let mut cond = Condition::all();
    let text_filters = [
        (issue::Column::IssueTitle, &filter.title),
        (issue::Column::IssueText, &filter.text),
        (issue::Column::Open, &filter.open),
        (issue::Column::CreatedBy, &filter.created_by),
        (issue::Column::AssignedTo, &filter.assigned_to),
        (issue::Column::StatusText, &filter.status_text),
        (issue::Column::AssignedTo, &filter.assigned_filter),
        (issue::Column::StatusText, &filter.assigned_filter),
    ];
    for (col, value) in text_filters {
        if let Some(v) = value {
            cond = cond.add(col.eq(v.as_str()));
        }
    }
    for (col, value) in [(issue::Column::CreatedOn, filter.created_on), (issue::Column::UpdatedOn, filter.updated_on)] {
        if let Some(DateMatch::At(t)) = value {
            cond = cond.add(col.eq(t.fixed_offset()));
        }
    }
    cond
}

#[async_trait::async_trait]
impl IssueRepository for SeaOrmIssueRepository {
    async fn list(&self, project_name: &str, filter: &IssueFilter) -> Result<Vec<Issue>, ServiceError> {
        let p = project::find_by_name(&self.db, project_name)
            .await?
            .ok_or_else(|| ServiceError::ProjectNotFound(project_name.to_string()))?;
        if filter.matches_nothing() {
            return Ok(Vec::new());
        }
        let rows = issue::Entity::find()
            .filter(issue::Column::ProjectId.eq(p.id))
            .filter(condition(filter))
            .order_by_asc(issue::Column::Position)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(to_issue).collect())
    }

    async fn create(&self, project_name: &str, new: Issue) -> Result<Issue, ServiceError> {
        let txn = self.db.begin().await?;
        let p = project::ensure_locked(&txn, project_name).await?;
        let position = issue::next_position(&txn, p.id).await?;
        let am = issue::ActiveModel {
            id: Set(new.id),
            project_id: Set(p.id),
            position: Set(position),
            issue_title: Set(new.title.clone()),
            issue_text: Set(new.text.clone()),
            created_by: Set(new.created_by.clone()),
            assigned_to: Set(new.assigned_to.clone()),
            status_text: Set(new.status_text.clone()),
            open: Set(new.open.clone()),
            created_on: Set(new.created_on.fixed_offset()),
            updated_on: Set(new.updated_on.fixed_offset()),
        };
        am.insert(&txn).await?;
        txn.commit().await?;
        debug!(project = %project_name, issue_id = %new.id, position, "issue row inserted");
        Ok(new)
    }

    async fn update(&self, project_name: &str, id: Uuid, patch: &IssuePatch) -> Result<bool, ServiceError> {
        let txn = self.db.begin().await?;
        let Some(p) = project::lock_by_name(&txn, project_name).await? else { return Ok(false) };
        let Some(row) = issue::find_in_project(&txn, p.id, id).await? else { return Ok(false) };

        let mut updated = to_issue(row.clone());
        patch.apply(&mut updated);

        let mut am: issue::ActiveModel = row.into();
        am.issue_title = Set(updated.title);
        am.issue_text = Set(updated.text);
        am.created_by = Set(updated.created_by);
        am.assigned_to = Set(updated.assigned_to);
        am.status_text = Set(updated.status_text);
        am.open = Set(updated.open);
        am.updated_on = Set(updated.updated_on.fixed_offset());
        am.update(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn delete(&self, project_name: &str, id: Uuid) -> Result<bool, ServiceError> {
        let txn = self.db.begin().await?;
        let Some(p) = project::lock_by_name(&txn, project_name).await? else { return Ok(false) };
        let removed = issue::delete_in_project(&txn, p.id, id).await?;
        txn.commit().await?;
        Ok(removed)
    }
}

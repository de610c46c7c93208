use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use service::issues::{
    domain::{DeleteIssueInput, Issue, NewIssueInput, UpdateIssueInput},
    filter::IssueFilter,
};

use super::AppState;
use crate::{errors::ApiError, extract::FormOrJson};

/// Confirmation for update/delete; the full issue is not returned.
#[derive(Debug, Serialize)]
pub struct OperationResult {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: Uuid,
}

/// GET /api/issues/{project}
pub async fn list_issues(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let filter = IssueFilter::from_pairs(params);
    let issues = state.issues.list(&project, &filter).await?;
    Ok(Json(issues))
}

/// POST /api/issues/{project}
pub async fn create_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    FormOrJson(input): FormOrJson<NewIssueInput>,
) -> Result<Json<Issue>, ApiError> {
    let created = state.issues.create(&project, input).await?;
    Ok(Json(created))
}

/// PUT /api/issues/{project}
pub async fn update_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    FormOrJson(input): FormOrJson<UpdateIssueInput>,
) -> Result<Json<OperationResult>, ApiError> {
    let id = state.issues.update(&project, input).await?;
    Ok(Json(OperationResult { result: "successfully updated", id }))
}

/// DELETE /api/issues/{project}
pub async fn delete_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    FormOrJson(input): FormOrJson<DeleteIssueInput>,
) -> Result<Json<OperationResult>, ApiError> {
    let id = state.issues.delete(&project, input).await?;
    Ok(Json(OperationResult { result: "successfully deleted", id }))
}

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::errors::ServiceError;

pub const OPEN: &str = "true";
pub const CLOSED: &str = "false";

/// A tracked issue as stored and as returned to clients.
///
/// Field names on the wire follow the established client contract
/// (`_id`, `issue_title`, `issue_text`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "issue_title")]
    pub title: String,
    #[serde(rename = "issue_text")]
    pub text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    #[serde(serialize_with = "serialize_millis")]
    pub created_on: DateTime<Utc>,
    #[serde(serialize_with = "serialize_millis")]
    pub updated_on: DateTime<Utc>,
    pub open: String,
}

fn serialize_millis<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Current time truncated to millisecond precision, the resolution every backend stores.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Timestamp for a mutation that must land strictly after `previous`.
pub fn stamp_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_millis();
    if now > previous { now } else { previous + Duration::milliseconds(1) }
}

/// `open` as submitted: forms send strings, JSON clients may send booleans.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

impl FlagValue {
    fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            FlagValue::Text(t) => match t.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
        }
    }

    pub fn is_close(&self) -> bool { self.as_bool() == Some(false) }

    pub fn is_reopen(&self) -> bool { self.as_bool() == Some(true) }
}

/// Treat `""` the same as an absent field, like the form clients do.
fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

fn empty_as_none<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(non_empty(Option::<String>::deserialize(d)?))
}

/// Body of `POST /api/issues/{project}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewIssueInput {
    #[serde(default, rename = "issue_title", alias = "title", deserialize_with = "empty_as_none")]
    pub title: Option<String>,
    #[serde(default, rename = "issue_text", alias = "text", deserialize_with = "empty_as_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_by: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub title: String,
    pub text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
}

impl NewIssueInput {
    pub fn validate(self) -> Result<NewIssue, ServiceError> {
        let (Some(title), Some(text), Some(created_by)) =
            (non_empty(self.title), non_empty(self.text), non_empty(self.created_by))
        else {
            return Err(ServiceError::MissingRequiredFields);
        };
        Ok(NewIssue {
            title,
            text,
            created_by,
            assigned_to: self.assigned_to.unwrap_or_default(),
            status_text: self.status_text.unwrap_or_default(),
        })
    }
}

impl NewIssue {
    /// Materialise with a fresh id; both timestamps share the same instant.
    pub fn into_issue(self) -> Issue {
        let now = now_millis();
        Issue {
            id: Uuid::new_v4(),
            title: self.title,
            text: self.text,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
            status_text: self.status_text,
            created_on: now,
            updated_on: now,
            open: OPEN.to_string(),
        }
    }
}

/// Body of `PUT /api/issues/{project}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateIssueInput {
    #[serde(default, rename = "_id", alias = "id", deserialize_with = "empty_as_none")]
    pub id: Option<String>,
    #[serde(default, rename = "issue_title", alias = "title", deserialize_with = "empty_as_none")]
    pub title: Option<String>,
    #[serde(default, rename = "issue_text", alias = "text", deserialize_with = "empty_as_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status_text: Option<String>,
    #[serde(default)]
    pub open: Option<FlagValue>,
}

/// Body of `DELETE /api/issues/{project}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteIssueInput {
    #[serde(default, rename = "_id", alias = "id", deserialize_with = "empty_as_none")]
    pub id: Option<String>,
}

/// Partial update applied to a single issue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub close: bool,
}

impl IssuePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && !self.close
    }

    /// Apply in place and bump `updated_on`. `created_on` and `id` never change.
    pub fn apply(&self, issue: &mut Issue) {
        if let Some(v) = &self.title { issue.title = v.clone(); }
        if let Some(v) = &self.text { issue.text = v.clone(); }
        if let Some(v) = &self.created_by { issue.created_by = v.clone(); }
        if let Some(v) = &self.assigned_to { issue.assigned_to = v.clone(); }
        if let Some(v) = &self.status_text { issue.status_text = v.clone(); }
        if self.close { issue.open = CLOSED.to_string(); }
        issue.updated_on = stamp_after(issue.updated_on.max(issue.created_on));
    }
}

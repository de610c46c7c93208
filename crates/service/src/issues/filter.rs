//! Exact-match issue filters built from list query parameters.
//!
//! Every supplied field must equal the issue's value (AND). Keys the filter
//! does not know are ignored, and empty values count as not supplied.
//! Date fields are compared as instants at millisecond precision.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};

use super::domain::Issue;

/// Parsed value of a date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMatch {
    At(DateTime<Utc>),
    /// The input was not a date; no issue can match.
    Never,
}

impl DateMatch {
    fn parse(raw: &str) -> Self {
        parse_date(raw).map(DateMatch::At).unwrap_or(DateMatch::Never)
    }

    fn matches(&self, t: &DateTime<Utc>) -> bool {
        match self {
            DateMatch::At(want) => want == t,
            DateMatch::Never => false,
        }
    }
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (UTC), `YYYY-MM-DD`
/// (UTC midnight) and epoch milliseconds.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let parsed = if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        t.with_timezone(&Utc)
    } else if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        t.and_utc()
    } else if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        d.and_hms_opt(0, 0, 0)?.and_utc()
    } else if let Ok(ms) = raw.parse::<i64>() {
        DateTime::from_timestamp_millis(ms)?
    } else {
        return None;
    };
    Some(parsed.trunc_subsecs(3))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFilter {
    pub title: Option<String>,
    pub text: Option<String>,
    pub open: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub created_on: Option<DateMatch>,
    pub updated_on: Option<DateMatch>,
    /// Legacy `assigned_filter` key: the value must equal BOTH `assigned_to`
    /// and `status_text`. Kept for compatibility with existing clients.
    pub assigned_filter: Option<String>,
}

impl IssueFilter {
    /// Build from query pairs. For a repeated key the last value wins; the
    /// canonical `issue_title`/`issue_text` keys win over `title`/`text`
    /// regardless of order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut f = IssueFilter::default();
        let (mut title_alias, mut text_alias) = (None, None);
        for (k, v) in pairs {
            let v: String = v.into();
            if v.is_empty() {
                continue;
            }
            match k.as_ref() {
                "issue_title" => f.title = Some(v),
                "title" => title_alias = Some(v),
                "issue_text" => f.text = Some(v),
                "text" => text_alias = Some(v),
                "open" => f.open = Some(v),
                "created_by" => f.created_by = Some(v),
                "assigned_to" => f.assigned_to = Some(v),
                "status_text" => f.status_text = Some(v),
                "created_on" => f.created_on = Some(DateMatch::parse(&v)),
                "updated_on" => f.updated_on = Some(DateMatch::parse(&v)),
                "assigned_filter" => f.assigned_filter = Some(v),
                _ => {}
            }
        }
        f.title = f.title.or(title_alias);
        f.text = f.text.or(text_alias);
        f
    }

    pub fn is_empty(&self) -> bool {
        *self == IssueFilter::default()
    }

    /// True when some date filter could not be parsed.
    pub fn matches_nothing(&self) -> bool {
        self.created_on == Some(DateMatch::Never) || self.updated_on == Some(DateMatch::Never)
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        fn eq(want: &Option<String>, have: &str) -> bool {
            want.as_deref().map_or(true, |w| w == have)
        }
        eq(&self.title, &issue.title)
            && eq(&self.text, &issue.text)
            && eq(&self.open, &issue.open)
            && eq(&self.created_by, &issue.created_by)
            && eq(&self.assigned_to, &issue.assigned_to)
            && eq(&self.status_text, &issue.status_text)
            && eq(&self.assigned_filter, &issue.assigned_to)
            && eq(&self.assigned_filter, &issue.status_text)
            && self.created_on.map_or(true, |d| d.matches(&issue.created_on))
            && self.updated_on.map_or(true, |d| d.matches(&issue.updated_on))
    }

    /// Filter a project's issues, preserving storage order.
    pub fn apply<'a, I>(&self, issues: I) -> Vec<Issue>
    where
        I: IntoIterator<Item = &'a Issue>,
    {
        if self.matches_nothing() {
            return Vec::new();
        }
        issues.into_iter().filter(|i| self.matches(i)).cloned().collect()
    }
}

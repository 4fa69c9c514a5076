//! Raw wire shapes for the tracker's REST API and their normalized
//! internal counterparts.
//!
//! Raw records are deserialized exactly once at the normalization
//! boundary; the rest of the engine only ever sees the normalized
//! types. Normalization may skip a malformed record (bad timestamp)
//! instead of failing the whole page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use warden_core::time_utils::parse_rfc3339;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawUser {
    pub login: String,
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawLabel {
    pub name: String,
}

/// An entry from the issue listing. Pull requests masquerade as issues
/// in this listing and are recognized by the `pull_request` key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawIssue {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub user: RawUser,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    #[serde(default)]
    pub comments: u64,
    pub comments_url: String,
    pub url: String,
    #[serde(default)]
    pub pull_request: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawRepo {
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawBranchRef {
    /// Branch name within the repository.
    #[serde(rename = "ref")]
    pub branch: String,
    /// Absent when the source fork has been deleted.
    #[serde(default)]
    pub repo: Option<RawRepo>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPull {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub user: RawUser,
    pub created_at: String,
    pub updated_at: String,
    pub head: RawBranchRef,
    pub base: RawBranchRef,
    #[serde(default)]
    pub diff_url: Option<String>,
    pub issue_url: String,
    pub comments_url: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawComment {
    pub user: RawUser,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: String,
}

/// Flattened issue with timezone-aware timestamps and deduplicated
/// label names in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedIssue {
    pub title: String,
    pub author_login: String,
    pub author_id: u64,
    pub body: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub labels: Vec<String>,
    pub comments: u64,
    pub comments_url: String,
    pub url: String,
}

/// Flattened pull request. Labels are issue-scoped in the tracker, so
/// they arrive empty from normalization and are filled in from the
/// `issue_url` resource by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPr {
    pub title: Option<String>,
    pub author_login: String,
    pub author_id: u64,
    pub body: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub labels: Vec<String>,
    pub source_repo: Option<String>,
    pub source_branch: String,
    pub target_repo: Option<String>,
    pub target_branch: String,
    pub diff_url: Option<String>,
    pub issue_url: String,
    pub comments_url: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub author_login: String,
    pub author_id: u64,
    pub body: Option<String>,
    pub created: DateTime<Utc>,
}

/// `owner/name` repository reference used to build API URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Option<Self> {
        let (owner, name) = raw.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

fn dedup_labels(labels: &[RawLabel]) -> Vec<String> {
    let mut seen = Vec::new();
    for label in labels {
        if !seen.iter().any(|existing: &String| existing == &label.name) {
            seen.push(label.name.clone());
        }
    }
    seen
}

/// Converts a raw issue, returning `None` when a timestamp is malformed.
pub fn normalize_issue(raw: &RawIssue) -> Option<NormalizedIssue> {
    Some(NormalizedIssue {
        title: raw.title.clone().unwrap_or_default(),
        author_login: raw.user.login.clone(),
        author_id: raw.user.id,
        body: raw.body.clone(),
        created: parse_rfc3339(&raw.created_at)?,
        updated: parse_rfc3339(&raw.updated_at)?,
        labels: dedup_labels(&raw.labels),
        comments: raw.comments,
        comments_url: raw.comments_url.clone(),
        url: raw.url.clone(),
    })
}

/// Converts a raw pull request, returning `None` when a timestamp is
/// malformed.
pub fn normalize_pull(raw: &RawPull) -> Option<NormalizedPr> {
    Some(NormalizedPr {
        title: raw.title.clone(),
        author_login: raw.user.login.clone(),
        author_id: raw.user.id,
        body: raw.body.clone(),
        created: parse_rfc3339(&raw.created_at)?,
        updated: parse_rfc3339(&raw.updated_at)?,
        labels: Vec::new(),
        source_repo: raw.head.repo.as_ref().map(|repo| repo.full_name.clone()),
        source_branch: raw.head.branch.clone(),
        target_repo: raw.base.repo.as_ref().map(|repo| repo.full_name.clone()),
        target_branch: raw.base.branch.clone(),
        diff_url: raw.diff_url.clone(),
        issue_url: raw.issue_url.clone(),
        comments_url: raw.comments_url.clone(),
        url: raw.url.clone(),
    })
}

pub fn normalize_comment(raw: &RawComment) -> Option<Comment> {
    Some(Comment {
        author_login: raw.user.login.clone(),
        author_id: raw.user.id,
        body: raw.body.clone(),
        created: parse_rfc3339(&raw.created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_issue, normalize_pull, RawIssue, RawLabel, RawPull, RepoRef};
    use serde_json::json;

    fn sample_raw_issue() -> RawIssue {
        serde_json::from_value(json!({
            "title": "Printer on fire",
            "body": "It burns",
            "user": {"login": "alice", "id": 7},
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-02T00:00:00Z",
            "labels": [{"name": "bug"}, {"name": "bug"}, {"name": "firmware"}],
            "comments": 3,
            "comments_url": "https://api.example/issues/1/comments",
            "url": "https://api.example/issues/1"
        }))
        .expect("raw issue")
    }

    #[test]
    fn unit_normalize_issue_flattens_and_deduplicates_labels() {
        let issue = normalize_issue(&sample_raw_issue()).expect("normalize");
        assert_eq!(issue.author_login, "alice");
        assert_eq!(issue.author_id, 7);
        assert_eq!(issue.labels, vec!["bug".to_string(), "firmware".to_string()]);
        assert_eq!(issue.comments, 3);
    }

    #[test]
    fn unit_normalize_issue_skips_malformed_timestamp() {
        let mut raw = sample_raw_issue();
        raw.created_at = "yesterday-ish".to_string();
        assert!(normalize_issue(&raw).is_none());
    }

    #[test]
    fn functional_normalize_pull_maps_branch_pairs() {
        let raw: RawPull = serde_json::from_value(json!({
            "title": "Add feature",
            "body": null,
            "user": {"login": "bob", "id": 9},
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z",
            "head": {"ref": "feature/widgets", "repo": {"full_name": "bob/fork"}},
            "base": {"ref": "main", "repo": {"full_name": "acme/widgets"}},
            "diff_url": "https://example/pulls/2.diff",
            "issue_url": "https://api.example/issues/2",
            "comments_url": "https://api.example/issues/2/comments",
            "url": "https://api.example/pulls/2"
        }))
        .expect("raw pull");

        let pull = normalize_pull(&raw).expect("normalize");
        assert_eq!(pull.source_branch, "feature/widgets");
        assert_eq!(pull.source_repo.as_deref(), Some("bob/fork"));
        assert_eq!(pull.target_branch, "main");
        assert!(pull.labels.is_empty());
        assert!(pull.body.is_none());
    }

    #[test]
    fn regression_normalize_pull_tolerates_deleted_fork_repo() {
        let raw: RawPull = serde_json::from_value(json!({
            "title": "Orphaned",
            "user": {"login": "bob", "id": 9},
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z",
            "head": {"ref": "gone", "repo": null},
            "base": {"ref": "main", "repo": {"full_name": "acme/widgets"}},
            "issue_url": "https://api.example/issues/3",
            "comments_url": "https://api.example/issues/3/comments",
            "url": "https://api.example/pulls/3"
        }))
        .expect("raw pull");
        let pull = normalize_pull(&raw).expect("normalize");
        assert!(pull.source_repo.is_none());
    }

    #[test]
    fn unit_repo_ref_parse_accepts_owner_name_only() {
        let repo = RepoRef::parse("acme/widgets").expect("parse");
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.full_name(), "acme/widgets");
        assert!(RepoRef::parse("acme").is_none());
        assert!(RepoRef::parse("acme/widgets/extra").is_none());
        assert!(RepoRef::parse("/widgets").is_none());
    }
}

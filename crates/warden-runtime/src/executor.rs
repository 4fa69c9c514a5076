//! Single chokepoint for mutating API calls.
//!
//! In dry-run mode every mutation is logged with method, URL, and
//! payload instead of being sent, so a dry run is fully inspectable
//! without side effects. Label updates are read-modify-write against
//! the issue resource; a concurrent external label change between the
//! read and the patch is overwritten (known limitation of the target
//! API, which offers no conditional update for this resource).

use serde_json::json;
use tracing::{debug, info};
use warden_github::models::RawIssue;

use crate::api_client::{ApiError, GithubApiClient};

pub struct ActionExecutor<'a> {
    client: &'a GithubApiClient,
    dry_run: bool,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(client: &'a GithubApiClient, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    pub fn post_comment(&self, comments_url: &str, body: &str) -> Result<(), ApiError> {
        let payload = json!({ "body": body });
        if self.dry_run {
            info!("dry-run: POST {comments_url} payload={payload}");
            return Ok(());
        }
        debug!(%comments_url, "posting comment");
        self.client.post_json(comments_url, &payload)
    }

    /// Adds `label` to the issue's current label set. For pull
    /// requests pass the PR's `issue_url`; label storage is
    /// issue-scoped in the tracker.
    pub fn add_label(&self, issue_url: &str, label: &str) -> Result<(), ApiError> {
        let mut labels = self.current_labels(issue_url)?;
        if labels.iter().any(|existing| existing == label) {
            return Ok(());
        }
        labels.push(label.to_string());
        self.set_labels(issue_url, labels)
    }

    pub fn remove_label(&self, issue_url: &str, label: &str) -> Result<(), ApiError> {
        let mut labels = self.current_labels(issue_url)?;
        let before = labels.len();
        labels.retain(|existing| existing != label);
        if labels.len() == before {
            return Ok(());
        }
        self.set_labels(issue_url, labels)
    }

    pub fn close_issue(&self, issue_url: &str) -> Result<(), ApiError> {
        let payload = json!({ "state": "closed" });
        if self.dry_run {
            info!("dry-run: PATCH {issue_url} payload={payload}");
            return Ok(());
        }
        debug!(%issue_url, "closing issue");
        self.client.patch_json(issue_url, &payload)
    }

    fn current_labels(&self, issue_url: &str) -> Result<Vec<String>, ApiError> {
        let issue: RawIssue = self.client.get_json(issue_url)?;
        Ok(issue.labels.into_iter().map(|label| label.name).collect())
    }

    fn set_labels(&self, issue_url: &str, labels: Vec<String>) -> Result<(), ApiError> {
        let payload = json!({ "labels": labels });
        if self.dry_run {
            info!("dry-run: PATCH {issue_url} payload={payload}");
            return Ok(());
        }
        debug!(%issue_url, ?labels, "replacing label set");
        self.client.patch_json(issue_url, &payload)
    }
}

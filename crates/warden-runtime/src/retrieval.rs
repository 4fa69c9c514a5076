//! Retrieval pipeline: paginated fetch, entry filter, normalization.
//!
//! All pages are concatenated before the filter runs; the converter
//! may drop a malformed record by returning `None`. A transport
//! failure on any page aborts the whole retrieval.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;
use warden_github::models::{
    normalize_comment, normalize_issue, normalize_pull, Comment, NormalizedIssue, NormalizedPr,
    RawComment, RawIssue, RawPull, RepoRef,
};

use crate::api_client::{ApiError, GithubApiClient};

/// Fetches all matching entries: paginate, filter, convert (skipping
/// records the converter rejects).
pub fn fetch_entries<R, T>(
    client: &GithubApiClient,
    first_url: &str,
    keep: impl Fn(&R) -> bool,
    convert: impl Fn(&R) -> Option<T>,
) -> Result<Vec<T>, ApiError>
where
    R: DeserializeOwned,
{
    let raw: Vec<R> = client.list_paginated(first_url)?;
    let unfiltered = raw.len();
    let entries: Vec<T> = raw
        .iter()
        .filter(|record| keep(record))
        .filter_map(|record| {
            let converted = convert(record);
            if converted.is_none() {
                debug!("skipping malformed record");
            }
            converted
        })
        .collect();
    debug!(unfiltered, kept = entries.len(), "retrieval complete");
    Ok(entries)
}

/// Open issues updated since the given instant, excluding the pull
/// requests that masquerade as issues in this listing.
pub fn fetch_issues(
    client: &GithubApiClient,
    repo: &RepoRef,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<NormalizedIssue>, ApiError> {
    fetch_entries::<RawIssue, _>(
        client,
        &client.issues_url(repo, since),
        |raw| raw.pull_request.is_none(),
        normalize_issue,
    )
}

/// All open pull requests. The pulls listing has no `since` filter;
/// the watermark cut happens per item in the run loop.
pub fn fetch_pulls(client: &GithubApiClient, repo: &RepoRef) -> Result<Vec<NormalizedPr>, ApiError> {
    fetch_entries::<RawPull, _>(client, &client.pulls_url(repo), |_| true, normalize_pull)
}

/// All comments on one issue, in server order.
pub fn fetch_comments(client: &GithubApiClient, comments_url: &str) -> Result<Vec<Comment>, ApiError> {
    fetch_entries::<RawComment, _>(client, comments_url, |_| true, normalize_comment)
}

//! The `autolabel` batch: title-snippet driven labeling of new issues.

use tracing::{info, warn};
use warden_config::RunConfig;
use warden_github::labels_to_apply;
use warden_github::models::NormalizedIssue;

use crate::api_client::{ApiError, GithubApiClient};
use crate::executor::ActionExecutor;
use crate::retrieval::fetch_issues;
use crate::summary::RunSummary;

pub fn run_autolabel(client: &GithubApiClient, config: &RunConfig) -> Result<RunSummary, ApiError> {
    let executor = ActionExecutor::new(client, config.dry_run);
    if config.dry_run {
        info!("this is a dry run; mutations are logged, not sent");
    }

    let issues = fetch_issues(client, &config.repo, Some(config.since))?;
    info!("found {} issues to process", issues.len());

    let mut summary = RunSummary::default();
    for issue in &issues {
        summary.processed += 1;
        info!(
            "processing \"{}\" by {} (created {}, last updated {})",
            issue.title, issue.author_login, issue.created, issue.updated
        );
        match label_issue(&executor, config, issue) {
            Ok(applied) => summary.labeled += applied,
            Err(error) => {
                warn!(
                    issue = %issue.url,
                    error = %error,
                    "error while labeling issue, continuing with the next one"
                );
                summary.errored += 1;
            }
        }
    }
    Ok(summary)
}

fn label_issue(
    executor: &ActionExecutor<'_>,
    config: &RunConfig,
    issue: &NormalizedIssue,
) -> Result<usize, ApiError> {
    let labels = labels_to_apply(
        &issue.title,
        &issue.labels,
        &config.mappings,
        config.ignore_case,
    );
    for label in &labels {
        info!("... applying label '{label}'");
        executor.add_label(&issue.url, label)?;
    }
    Ok(labels.len())
}

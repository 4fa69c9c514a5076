//! The `prcheck` batch: branch/title/body policy over all open pull
//! requests.

use tracing::{info, warn};
use warden_config::RunConfig;
use warden_github::models::{NormalizedPr, RawIssue};
use warden_github::{format_branch_list, render_template, validate_pull, BranchPolicy, ProblemTag};

use crate::api_client::{ApiError, GithubApiClient};
use crate::executor::ActionExecutor;
use crate::retrieval::fetch_pulls;
use crate::summary::RunSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PullOutcome {
    Skipped,
    Compliant,
    Reminded,
}

pub fn run_prcheck(client: &GithubApiClient, config: &RunConfig) -> Result<RunSummary, ApiError> {
    let executor = ActionExecutor::new(client, config.dry_run);
    if config.dry_run {
        info!("this is a dry run; mutations are logged, not sent");
    }

    let pulls = fetch_pulls(client, &config.repo)?;
    info!("found {} pull requests to process", pulls.len());

    let policy = config.branch_policy();
    let mut summary = RunSummary::default();
    for pull in pulls {
        summary.processed += 1;
        info!(
            "processing \"{}\" by {} (created {}, last updated {})",
            pull.title.as_deref().unwrap_or("<untitled>"),
            pull.author_login,
            pull.created,
            pull.updated
        );
        match process_pull(client, &executor, config, &policy, pull) {
            Ok(PullOutcome::Skipped) => summary.skipped += 1,
            Ok(PullOutcome::Compliant) => {}
            Ok(PullOutcome::Reminded) => summary.reminded += 1,
            Err(error) => {
                warn!(
                    error = %error,
                    "error while processing pull request, continuing with the next one"
                );
                summary.errored += 1;
            }
        }
    }
    Ok(summary)
}

fn process_pull(
    client: &GithubApiClient,
    executor: &ActionExecutor<'_>,
    config: &RunConfig,
    policy: &BranchPolicy,
    mut pull: NormalizedPr,
) -> Result<PullOutcome, ApiError> {
    // Idempotence: PRs older than the watermark were checked in an
    // earlier run, and the configured label marks an already-flagged
    // PR; both skip before any validation.
    if pull.created < config.since {
        info!("... older than the watermark, skipping");
        return Ok(PullOutcome::Skipped);
    }
    if let Some(label) = config.label.as_deref() {
        // Labels are issue-scoped; fetch them through the back-reference.
        let issue: RawIssue = client.get_json(&pull.issue_url)?;
        pull.labels = issue.labels.into_iter().map(|label| label.name).collect();
        if pull.labels.iter().any(|existing| existing == label) {
            info!("... already labeled, skipping");
            return Ok(PullOutcome::Skipped);
        }
    }

    let problems = validate_pull(&pull, policy);
    if problems.is_empty() {
        return Ok(PullOutcome::Compliant);
    }
    info!(
        "... flagging problems: {:?}",
        problems.iter().map(|tag| tag.as_str()).collect::<Vec<_>>()
    );

    // With neither a reminder template nor a message for any flagged
    // problem, there is no comment body; the label still goes on.
    let body = render_reminder(config, &pull, &problems);
    if body.trim().is_empty() {
        warn!("no message configured for the flagged problems, skipping the comment");
    } else {
        executor.post_comment(&pull.comments_url, &body)?;
    }
    if let Some(label) = config.label.as_deref() {
        executor.add_label(&pull.issue_url, label)?;
    }
    Ok(PullOutcome::Reminded)
}

fn render_reminder(config: &RunConfig, pull: &NormalizedPr, problems: &[ProblemTag]) -> String {
    let values = [
        ("source_branch", pull.source_branch.clone()),
        ("target_branch", pull.target_branch.clone()),
        (
            "source_repo",
            pull.source_repo.clone().unwrap_or_default(),
        ),
        (
            "target_repo",
            pull.target_repo.clone().unwrap_or_default(),
        ),
        ("sources", format_branch_list(&config.sources)),
        ("targets", format_branch_list(&config.targets)),
        (
            "blacklisted_sources",
            format_branch_list(&config.blacklisted_sources),
        ),
        (
            "blacklisted_targets",
            format_branch_list(&config.blacklisted_targets),
        ),
    ];

    let problem_lines = problems
        .iter()
        .filter_map(|tag| config.problem_texts.get(tag.as_str()))
        .map(|template| render_template(template, &values))
        .collect::<Vec<_>>()
        .join("\n");

    if config.reminder.is_empty() {
        return problem_lines;
    }
    let mut reminder_values = values.to_vec();
    reminder_values.push(("author", pull.author_login.clone()));
    reminder_values.push(("problems", problem_lines));
    render_template(&config.reminder, &reminder_values)
}

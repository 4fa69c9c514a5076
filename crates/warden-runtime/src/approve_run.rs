//! The `approve` batch: trigger-phrase validation plus the
//! grace-period state machine over all recently updated issues.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use warden_config::RunConfig;
use warden_github::models::{Comment, NormalizedIssue};
use warden_github::{
    author_confirmed, classify_issue, effective_since, grace_period_elapsed, last_bot_comment,
    render_template, scan_issue, BodyScan, IssueDisposition, IssueValidity, TriggerPolicy,
};

use crate::api_client::{ApiError, GithubApiClient};
use crate::executor::ActionExecutor;
use crate::retrieval::{fetch_comments, fetch_issues};
use crate::summary::RunSummary;

#[derive(Debug, Default)]
struct IssueOutcome {
    marked_valid: bool,
    closed: bool,
    reminded: bool,
    hinted: bool,
}

/// Runs one approve batch. `now` is captured once by the caller; it is
/// also the watermark persisted after a successful non-dry run.
pub fn run_approve(
    client: &GithubApiClient,
    config: &RunConfig,
    now: DateTime<Utc>,
) -> Result<RunSummary, ApiError> {
    let executor = ActionExecutor::new(client, config.dry_run);
    if config.dry_run {
        info!("this is a dry run; mutations are logged, not sent");
    }

    // The bot id is only needed to find our own reminder comments, so
    // the extra request is skipped when escalation cannot happen.
    let escalation = config.escalation_enabled();
    let bot_id = if escalation {
        Some(client.bot_identity()?.id)
    } else {
        None
    };
    let since = effective_since(config.since, now, escalation.then_some(config.grace_period));

    let issues = fetch_issues(client, &config.repo, Some(since))?;
    info!("found {} issues to process", issues.len());

    let policy = config.trigger_policy();
    let mut summary = RunSummary::default();
    for issue in &issues {
        summary.processed += 1;
        info!(
            "processing \"{}\" by {} (created {}, last updated {})",
            issue.title, issue.author_login, issue.created, issue.updated
        );
        match process_issue(client, &executor, config, &policy, issue, bot_id, now) {
            Ok(outcome) => {
                summary.marked_valid += usize::from(outcome.marked_valid);
                summary.closed += usize::from(outcome.closed);
                summary.reminded += usize::from(outcome.reminded);
                summary.hinted += usize::from(outcome.hinted);
            }
            Err(error) => {
                warn!(
                    issue = %issue.url,
                    error = %error,
                    "error while processing issue, continuing with the next one"
                );
                summary.errored += 1;
            }
        }
    }
    Ok(summary)
}

fn process_issue(
    client: &GithubApiClient,
    executor: &ActionExecutor<'_>,
    config: &RunConfig,
    policy: &TriggerPolicy,
    issue: &NormalizedIssue,
    bot_id: Option<u64>,
    now: DateTime<Utc>,
) -> Result<IssueOutcome, ApiError> {
    let mut outcome = IssueOutcome::default();
    let mut comments_cache: Option<Vec<Comment>> = None;

    let validity = match scan_issue(issue, policy) {
        // An ignored issue counts as valid for the whole run: one that
        // also carries the incomplete label gets it removed rather than
        // left behind.
        BodyScan::OutOfScope | BodyScan::TriggerFound => IssueValidity::Valid,
        BodyScan::ObsoleteFound => IssueValidity::ValidWithUpgradeHint,
        BodyScan::NotFound if issue.comments > 0 => {
            let comments = fetch_comments(client, &issue.comments_url)?;
            let confirmed = author_confirmed(issue, &comments, &config.phrase);
            comments_cache = Some(comments);
            if confirmed {
                IssueValidity::Valid
            } else {
                IssueValidity::Invalid
            }
        }
        BodyScan::NotFound => IssueValidity::Invalid,
    };

    let created_after_watermark = issue.created >= config.since;

    if validity == IssueValidity::ValidWithUpgradeHint && created_after_watermark {
        if let Some(template) = &config.upgrade_hint {
            info!("... obsolete trigger phrase used, posting upgrade hint");
            let body = render_template(
                template,
                &[
                    ("author", issue.author_login.clone()),
                    ("phrase", config.phrase.clone()),
                ],
            );
            executor.post_comment(&issue.comments_url, &body)?;
            outcome.hinted = true;
        }
    }

    let labeled = config
        .label
        .as_ref()
        .is_some_and(|label| issue.labels.contains(label));

    match classify_issue(
        labeled,
        validity.is_valid(),
        created_after_watermark,
        config.escalation_enabled(),
        config.close_directly,
    ) {
        IssueDisposition::MarkValid => {
            let Some(label) = config.label.as_deref() else {
                return Ok(outcome);
            };
            info!("... author updated the issue with information, marking valid");
            executor.remove_label(&issue.url, label)?;
            outcome.marked_valid = true;
        }
        IssueDisposition::CheckEscalation => {
            let Some(bot_id) = bot_id else {
                return Ok(outcome);
            };
            let comments = match comments_cache {
                Some(comments) => comments,
                None => fetch_comments(client, &issue.comments_url)?,
            };
            // No bot comment yet means the issue was labeled outside a
            // reminder; nothing to escalate from.
            if let Some(bot_comment) = last_bot_comment(&comments, bot_id) {
                if grace_period_elapsed(now, config.grace_period, bot_comment.created) {
                    info!("... information still missing after the grace period, closing");
                    if let Some(closing) = &config.closing {
                        executor.post_comment(&issue.comments_url, closing)?;
                    }
                    executor.close_issue(&issue.url)?;
                    outcome.closed = true;
                }
            }
        }
        IssueDisposition::Remind => {
            info!("... reminding author of the information to include");
            let until = now + Duration::days(config.grace_period.max(0));
            let body = render_template(
                &config.reminder,
                &[
                    ("author", issue.author_login.clone()),
                    ("until", until.format("%Y-%m-%d %H:%M").to_string()),
                ],
            );
            executor.post_comment(&issue.comments_url, &body)?;
            if let Some(label) = config.label.as_deref() {
                executor.add_label(&issue.url, label)?;
            }
            outcome.reminded = true;
        }
        IssueDisposition::CloseDirectly => {
            info!("... information missing and direct closing configured, closing");
            if let Some(template) = &config.closing_now {
                let body = render_template(template, &[("author", issue.author_login.clone())]);
                executor.post_comment(&issue.comments_url, &body)?;
            }
            executor.close_issue(&issue.url)?;
            outcome.closed = true;
        }
        IssueDisposition::None => {}
    }

    Ok(outcome)
}

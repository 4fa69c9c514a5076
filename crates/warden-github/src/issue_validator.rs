//! Trigger-phrase validation for issues.
//!
//! The rules run in a fixed order so that out-of-scope checks and body
//! scans short-circuit before any comment fetch is needed: ignored
//! label/title, current phrase in body, obsolete phrase in body, and
//! only then the author's own comments.

use crate::models::{Comment, NormalizedIssue};

/// Final classification of an issue for one run.
///
/// `ValidWithUpgradeHint` replaces the original tool's "old phrase"
/// exception: the issue counts as valid, but the caller may post a
/// hint asking for the current phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueValidity {
    Valid,
    ValidWithUpgradeHint,
    Invalid,
}

impl IssueValidity {
    pub fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

/// Outcome of the network-free part of validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyScan {
    /// Ignored label or ignored title snippet; compliance does not apply.
    OutOfScope,
    /// Current trigger phrase found in the body.
    TriggerFound,
    /// Only an obsolete past phrase found in the body.
    ObsoleteFound,
    /// Nothing found; the author's comments may still confirm.
    NotFound,
}

/// Phrase and scope settings consumed by the validator.
#[derive(Debug, Clone, Default)]
pub struct TriggerPolicy {
    pub phrase: String,
    pub past_phrases: Vec<String>,
    pub ignored_labels: Vec<String>,
    pub ignored_titles: Vec<String>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn has_ignored_label(issue: &NormalizedIssue, ignored: &[String]) -> bool {
    issue
        .labels
        .iter()
        .any(|label| ignored.iter().any(|candidate| candidate == label))
}

fn has_ignored_title(issue: &NormalizedIssue, ignored: &[String]) -> bool {
    ignored
        .iter()
        .any(|snippet| contains_ignore_case(&issue.title, snippet))
}

/// Runs validation steps 1-3; never touches the network.
pub fn scan_issue(issue: &NormalizedIssue, policy: &TriggerPolicy) -> BodyScan {
    if has_ignored_label(issue, &policy.ignored_labels) || has_ignored_title(issue, &policy.ignored_titles)
    {
        return BodyScan::OutOfScope;
    }

    let body = issue.body.as_deref().unwrap_or_default();
    if contains_ignore_case(body, &policy.phrase) {
        return BodyScan::TriggerFound;
    }
    if policy
        .past_phrases
        .iter()
        .any(|past| contains_ignore_case(body, past))
    {
        return BodyScan::ObsoleteFound;
    }
    BodyScan::NotFound
}

/// Returns true when the issue's own author (by numeric id) posted a
/// comment containing the trigger phrase.
pub fn author_confirmed(issue: &NormalizedIssue, comments: &[Comment], phrase: &str) -> bool {
    comments.iter().any(|comment| {
        comment.author_id == issue.author_id
            && contains_ignore_case(comment.body.as_deref().unwrap_or_default(), phrase)
    })
}

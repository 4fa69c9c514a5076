//! Domain types and pure decision logic for the Warden compliance bot.
//!
//! Everything in this crate is side-effect free: wire-record shapes and
//! their normalization, the trigger-phrase validator, the grace-period
//! decision rules, the pull-request branch/title policy, autolabel
//! mappings, and message-template rendering. Network and persistence
//! live in `warden-runtime` and `warden-config`.

pub mod autolabel;
pub mod grace;
pub mod issue_validator;
pub mod models;
pub mod pr_policy;
pub mod template;

pub use autolabel::{labels_to_apply, parse_label_mapping, LabelMapping};
pub use grace::{
    classify_issue, effective_since, grace_period_elapsed, last_bot_comment, IssueDisposition,
    GRACE_CLOSE_SLACK_DAYS,
};
pub use issue_validator::{author_confirmed, scan_issue, BodyScan, IssueValidity, TriggerPolicy};
pub use models::{
    normalize_comment, normalize_issue, normalize_pull, Comment, NormalizedIssue, NormalizedPr,
    RawComment, RawIssue, RawLabel, RawPull, RawUser, RepoRef,
};
pub use pr_policy::{validate_pull, BranchPolicy, ProblemTag};
pub use template::{format_branch_list, render_template};

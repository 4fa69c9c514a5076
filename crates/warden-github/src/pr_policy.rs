//! Branch, body, and title policy checks for pull requests.

use regex::Regex;

use crate::models::NormalizedPr;

/// Symbolic reason a pull request failed policy validation. Values
/// render as snake_case tags matching the per-problem message table in
/// the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemTag {
    InvalidTarget,
    BlacklistedTarget,
    InvalidSource,
    BlacklistedSource,
    EmptyBody,
    InvalidTitle,
}

impl ProblemTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidTarget => "invalid_target",
            Self::BlacklistedTarget => "blacklisted_target",
            Self::InvalidSource => "invalid_source",
            Self::BlacklistedSource => "blacklisted_source",
            Self::EmptyBody => "empty_body",
            Self::InvalidTitle => "invalid_title",
        }
    }
}

/// Configured allow/deny lists plus the title pattern.
#[derive(Debug, Clone)]
pub struct BranchPolicy {
    pub targets: Vec<String>,
    pub blacklisted_targets: Vec<String>,
    pub sources: Vec<String>,
    pub blacklisted_sources: Vec<String>,
    pub ignore_case: bool,
    pub title_pattern: Regex,
}

impl BranchPolicy {
    fn fold(&self, value: &str) -> String {
        if self.ignore_case {
            value.to_lowercase()
        } else {
            value.to_string()
        }
    }

    fn list_contains(&self, list: &[String], branch: &str) -> bool {
        let branch = self.fold(branch);
        list.iter().any(|candidate| self.fold(candidate) == branch)
    }

    /// Anchored at the start of the title, like the original tool's
    /// pattern matching. The default `.*` accepts anything.
    fn title_matches(&self, title: &str) -> bool {
        self.title_pattern
            .find(title)
            .is_some_and(|found| found.start() == 0)
    }
}

/// Evaluates all checks in a fixed order and returns the ordered,
/// duplicate-free problem list. Empty means compliant.
pub fn validate_pull(pr: &NormalizedPr, policy: &BranchPolicy) -> Vec<ProblemTag> {
    let mut problems = Vec::new();

    if !policy.targets.is_empty() && !policy.list_contains(&policy.targets, &pr.target_branch) {
        problems.push(ProblemTag::InvalidTarget);
    }
    if policy.list_contains(&policy.blacklisted_targets, &pr.target_branch) {
        problems.push(ProblemTag::BlacklistedTarget);
    }
    if !policy.sources.is_empty() && !policy.list_contains(&policy.sources, &pr.source_branch) {
        problems.push(ProblemTag::InvalidSource);
    }
    if policy.list_contains(&policy.blacklisted_sources, &pr.source_branch) {
        problems.push(ProblemTag::BlacklistedSource);
    }
    if pr.body.as_deref().map_or(true, |body| body.trim().is_empty()) {
        problems.push(ProblemTag::EmptyBody);
    }
    match pr.title.as_deref() {
        Some(title) if policy.title_matches(title) => {}
        _ => problems.push(ProblemTag::InvalidTitle),
    }

    problems
}

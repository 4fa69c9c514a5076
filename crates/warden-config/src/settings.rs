//! Config shapes and validation.
//!
//! `BotConfig` is the mutable merge target for file values and CLI
//! overrides; `validate` turns it into an immutable `RunConfig` that
//! the engine consumes read-only. Validation fails fast before any
//! network activity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_core::time_utils::parse_rfc3339_lenient;
use warden_github::models::RepoRef;
use warden_github::LabelMapping;

pub const DEFAULT_GRACE_PERIOD_DAYS: i64 = 14;
pub const DEFAULT_PHRASE: &str = "I love cookies";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("token must be defined")]
    MissingToken,
    #[error("repo must be defined")]
    MissingRepo,
    #[error("repo '{0}' is not of the form owner/name")]
    InvalidRepo(String),
    #[error("reminder text must be defined")]
    MissingReminder,
    #[error("at least one tag=label mapping must be defined")]
    MissingMappings,
    #[error("'{0}' is not a recognized timestamp")]
    InvalidSince(String),
    #[error("invalid title pattern: {0}")]
    InvalidTitlePattern(#[from] regex::Error),
    #[error("failed to read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write config file {path}")]
    Write {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Which subcommand the config is being validated for; decides which
/// fields are mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Approve,
    Autolabel,
    PrCheck,
}

/// Raw configuration as persisted in the TOML file, before CLI merge
/// and validation. Every field is optional here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub token: Option<String>,
    pub repo: Option<String>,
    pub api_base: Option<String>,
    pub phrase: Option<String>,
    pub past_phrases: Vec<String>,
    pub reminder: Option<String>,
    pub closing: Option<String>,
    pub closing_now: Option<String>,
    pub upgrade_hint: Option<String>,
    pub grace_period: Option<i64>,
    pub close_directly: Option<bool>,
    pub label: Option<String>,
    pub ignored_labels: Vec<String>,
    pub ignored_titles: Vec<String>,
    pub targets: Vec<String>,
    pub blacklisted_targets: Vec<String>,
    pub sources: Vec<String>,
    pub blacklisted_sources: Vec<String>,
    pub title_pattern: Option<String>,
    pub problems: BTreeMap<String, String>,
    pub mappings: Vec<LabelMapping>,
    pub ignore_case: Option<bool>,
    /// ISO-8601 watermark; rewritten after each successful non-dry run.
    pub since: Option<String>,
    pub dryrun: Option<bool>,
    pub debug: Option<bool>,
}

/// Immutable, fully-defaulted settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub token: String,
    pub repo: RepoRef,
    pub api_base: String,
    pub phrase: String,
    pub past_phrases: Vec<String>,
    /// Empty when no reminder template is configured (never for approve).
    pub reminder: String,
    pub closing: Option<String>,
    pub closing_now: Option<String>,
    pub upgrade_hint: Option<String>,
    /// Days; `-1` disables auto-close.
    pub grace_period: i64,
    pub close_directly: bool,
    pub label: Option<String>,
    pub ignored_labels: Vec<String>,
    pub ignored_titles: Vec<String>,
    pub targets: Vec<String>,
    pub blacklisted_targets: Vec<String>,
    pub sources: Vec<String>,
    pub blacklisted_sources: Vec<String>,
    pub title_pattern: Regex,
    pub problem_texts: BTreeMap<String, String>,
    pub mappings: Vec<LabelMapping>,
    pub ignore_case: bool,
    pub since: DateTime<Utc>,
    pub dry_run: bool,
    pub debug: bool,
}

impl RunConfig {
    /// Auto-close escalation only runs with both a non-negative grace
    /// period and a configured label.
    pub fn escalation_enabled(&self) -> bool {
        self.grace_period >= 0 && self.label.is_some()
    }

    pub fn trigger_policy(&self) -> warden_github::TriggerPolicy {
        warden_github::TriggerPolicy {
            phrase: self.phrase.clone(),
            past_phrases: self.past_phrases.clone(),
            ignored_labels: self.ignored_labels.clone(),
            ignored_titles: self.ignored_titles.clone(),
        }
    }

    pub fn branch_policy(&self) -> warden_github::BranchPolicy {
        warden_github::BranchPolicy {
            targets: self.targets.clone(),
            blacklisted_targets: self.blacklisted_targets.clone(),
            sources: self.sources.clone(),
            blacklisted_sources: self.blacklisted_sources.clone(),
            ignore_case: self.ignore_case,
            title_pattern: self.title_pattern.clone(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

impl BotConfig {
    /// Checks mandatory fields for `command`, fills defaults, and
    /// freezes the result. `now` becomes the watermark when none is
    /// configured.
    pub fn validate(self, command: CommandKind, now: DateTime<Utc>) -> Result<RunConfig, ConfigError> {
        let token = non_blank(self.token).ok_or(ConfigError::MissingToken)?;
        let repo_raw = non_blank(self.repo).ok_or(ConfigError::MissingRepo)?;
        let repo = RepoRef::parse(&repo_raw).ok_or(ConfigError::InvalidRepo(repo_raw))?;

        let reminder = non_blank(self.reminder);
        if command == CommandKind::Approve && reminder.is_none() {
            return Err(ConfigError::MissingReminder);
        }
        if command == CommandKind::Autolabel && self.mappings.is_empty() {
            return Err(ConfigError::MissingMappings);
        }

        let since = match non_blank(self.since) {
            Some(raw) => parse_rfc3339_lenient(&raw).ok_or(ConfigError::InvalidSince(raw))?,
            None => now,
        };

        let title_pattern = Regex::new(self.title_pattern.as_deref().unwrap_or(".*"))?;

        Ok(RunConfig {
            token,
            repo,
            api_base: non_blank(self.api_base).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            phrase: non_blank(self.phrase).unwrap_or_else(|| DEFAULT_PHRASE.to_string()),
            past_phrases: self.past_phrases,
            reminder: reminder.unwrap_or_default(),
            closing: non_blank(self.closing),
            closing_now: non_blank(self.closing_now),
            upgrade_hint: non_blank(self.upgrade_hint),
            grace_period: self.grace_period.unwrap_or(DEFAULT_GRACE_PERIOD_DAYS),
            close_directly: self.close_directly.unwrap_or(false),
            label: non_blank(self.label),
            ignored_labels: self.ignored_labels,
            ignored_titles: self.ignored_titles,
            targets: self.targets,
            blacklisted_targets: self.blacklisted_targets,
            sources: self.sources,
            blacklisted_sources: self.blacklisted_sources,
            title_pattern,
            problem_texts: self.problems,
            mappings: self.mappings,
            ignore_case: self.ignore_case.unwrap_or(false),
            since,
            dry_run: self.dryrun.unwrap_or(false),
            debug: self.debug.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{BotConfig, CommandKind, ConfigError, DEFAULT_GRACE_PERIOD_DAYS, DEFAULT_PHRASE};
    use warden_github::LabelMapping;

    fn minimal() -> BotConfig {
        BotConfig {
            token: Some("secret".to_string()),
            repo: Some("acme/widgets".to_string()),
            reminder: Some("please add details".to_string()),
            ..BotConfig::default()
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn unit_validate_fills_defaults() {
        let run = minimal().validate(CommandKind::Approve, now()).expect("validate");
        assert_eq!(run.phrase, DEFAULT_PHRASE);
        assert_eq!(run.grace_period, DEFAULT_GRACE_PERIOD_DAYS);
        assert_eq!(run.since, now());
        assert!(!run.dry_run);
        assert!(run.title_pattern.is_match("anything at all"));
        assert_eq!(run.repo.owner, "acme");
    }

    #[test]
    fn unit_validate_rejects_missing_mandatory_fields() {
        let mut config = minimal();
        config.token = None;
        assert!(matches!(
            config.validate(CommandKind::Approve, now()),
            Err(ConfigError::MissingToken)
        ));

        let mut config = minimal();
        config.repo = Some("not-a-repo".to_string());
        assert!(matches!(
            config.validate(CommandKind::Approve, now()),
            Err(ConfigError::InvalidRepo(_))
        ));

        let mut config = minimal();
        config.reminder = Some("   ".to_string());
        assert!(matches!(
            config.validate(CommandKind::Approve, now()),
            Err(ConfigError::MissingReminder)
        ));
    }

    #[test]
    fn functional_reminder_only_mandatory_for_approve() {
        let mut config = minimal();
        config.reminder = None;
        config.mappings = vec![LabelMapping {
            tag: "[Bug]".to_string(),
            label: "bug".to_string(),
        }];
        assert!(config.clone().validate(CommandKind::Autolabel, now()).is_ok());
        assert!(config.validate(CommandKind::PrCheck, now()).is_ok());
    }

    #[test]
    fn functional_autolabel_requires_a_mapping() {
        let mut config = minimal();
        config.reminder = None;
        assert!(matches!(
            config.validate(CommandKind::Autolabel, now()),
            Err(ConfigError::MissingMappings)
        ));
    }

    #[test]
    fn unit_validate_parses_since_and_rejects_garbage() {
        let mut config = minimal();
        config.since = Some("2026-01-15T06:00:00Z".to_string());
        let run = config.validate(CommandKind::Approve, now()).expect("validate");
        assert_eq!(
            run.since,
            Utc.with_ymd_and_hms(2026, 1, 15, 6, 0, 0).unwrap()
        );

        let mut config = minimal();
        config.since = Some("whenever".to_string());
        assert!(matches!(
            config.validate(CommandKind::Approve, now()),
            Err(ConfigError::InvalidSince(_))
        ));
    }

    #[test]
    fn unit_validate_rejects_bad_title_pattern() {
        let mut config = minimal();
        config.title_pattern = Some("([unclosed".to_string());
        assert!(matches!(
            config.validate(CommandKind::PrCheck, now()),
            Err(ConfigError::InvalidTitlePattern(_))
        ));
    }

    #[test]
    fn regression_escalation_requires_label_and_non_negative_grace() {
        let mut config = minimal();
        config.label = Some("incomplete".to_string());
        config.grace_period = Some(-1);
        let run = config.validate(CommandKind::Approve, now()).expect("validate");
        assert!(!run.escalation_enabled());

        let mut config = minimal();
        config.label = Some("incomplete".to_string());
        config.grace_period = Some(0);
        let run = config.validate(CommandKind::Approve, now()).expect("validate");
        assert!(run.escalation_enabled());

        let run = minimal().validate(CommandKind::Approve, now()).expect("validate");
        assert!(!run.escalation_enabled());
    }
}

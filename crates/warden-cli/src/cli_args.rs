//! clap-backed argument models for the `warden` binary and the merge
//! of CLI values over the loaded config file.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use warden_config::{BotConfig, CommandKind};
use warden_core::time_utils::{format_rfc3339, parse_rfc3339_lenient};
use warden_github::{parse_label_mapping, LabelMapping};

fn parse_since(value: &str) -> Result<DateTime<Utc>, String> {
    parse_rfc3339_lenient(value)
        .ok_or_else(|| format!("'{value}' is not a recognized ISO-8601 timestamp"))
}

#[derive(Debug, Parser)]
#[command(
    name = "warden",
    about = "Compliance bot for issues and pull requests in a hosted git repository",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate issues for the trigger phrase; remind, label, and close
    /// non-compliant ones after the grace period.
    Approve(ApproveArgs),
    /// Apply labels to issues whose title contains configured snippets.
    Autolabel(AutolabelArgs),
    /// Check open pull requests against branch, body, and title policies.
    Prcheck(PrCheckArgs),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Approve(_) => CommandKind::Approve,
            Self::Autolabel(_) => CommandKind::Autolabel,
            Self::Prcheck(_) => CommandKind::PrCheck,
        }
    }

    pub fn common(&self) -> &CommonArgs {
        match self {
            Self::Approve(args) => &args.common,
            Self::Autolabel(args) => &args.common,
            Self::Prcheck(args) => &args.common,
        }
    }

    /// Overlays all CLI values onto the loaded file config. Boolean
    /// flags only ever turn a setting on; absent flags keep the file
    /// value.
    pub fn merge_into(&self, config: &mut BotConfig) {
        self.common().merge_into(config);
        match self {
            Self::Approve(args) => args.merge_into(config),
            Self::Autolabel(args) => args.merge_into(config),
            Self::Prcheck(args) => args.merge_into(config),
        }
    }
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    #[arg(short = 'c', long, help = "Config file to use")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 't',
        long,
        env = "WARDEN_TOKEN",
        help = "API token, must be defined on the CLI, in the environment, or in the config"
    )]
    pub token: Option<String>,

    #[arg(
        short = 'r',
        long,
        env = "WARDEN_REPO",
        help = "Repository to process, as owner/name"
    )]
    pub repo: Option<String>,

    #[arg(
        short = 's',
        long,
        value_parser = parse_since,
        help = "Only process items created or updated after this ISO-8601 instant, defaults to now"
    )]
    pub since: Option<DateTime<Utc>>,

    #[arg(long, help = "Base URL of the tracker API")]
    pub api_base: Option<String>,

    #[arg(short = 'i', long, help = "Ignore case when matching branch names and title snippets")]
    pub ignore_case: bool,

    #[arg(long, help = "Just log what would be done without actually doing it")]
    pub dry_run: bool,

    #[arg(long, help = "Enable debug logging")]
    pub debug: bool,
}

impl CommonArgs {
    fn merge_into(&self, config: &mut BotConfig) {
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(repo) = &self.repo {
            config.repo = Some(repo.clone());
        }
        if let Some(since) = self.since {
            config.since = Some(format_rfc3339(since));
        }
        if let Some(api_base) = &self.api_base {
            config.api_base = Some(api_base.clone());
        }
        if self.ignore_case {
            config.ignore_case = Some(true);
        }
        if self.dry_run {
            config.dryrun = Some(true);
        }
        if self.debug {
            config.debug = Some(true);
        }
    }
}

#[derive(Debug, Args)]
pub struct ApproveArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(
        short = 'p',
        long,
        help = "Trigger phrase to look for in the issue body or the author's comments"
    )]
    pub phrase: Option<String>,

    #[arg(
        long = "past-phrase",
        help = "Obsolete trigger phrase still worth an upgrade hint; repeatable"
    )]
    pub past_phrases: Vec<String>,

    #[arg(long, help = "Comment template reminding people of missing information")]
    pub reminder: Option<String>,

    #[arg(long, help = "Comment posted when closing an issue after the grace period")]
    pub closing: Option<String>,

    #[arg(
        long,
        help = "Comment template posted when closing a non-compliant issue immediately"
    )]
    pub closing_now: Option<String>,

    #[arg(long, help = "Close non-compliant new issues immediately instead of reminding")]
    pub close_directly: bool,

    #[arg(
        long,
        help = "Comment template hinting at the current phrase when an obsolete one was used"
    )]
    pub upgrade_hint: Option<String>,

    #[arg(
        short = 'g',
        long = "grace",
        allow_negative_numbers = true,
        help = "Grace period in days before closing issues lacking information; -1 disables auto-close"
    )]
    pub grace_period: Option<i64>,

    #[arg(
        short = 'l',
        long,
        help = "Label applied to issues missing information; must exist in the repository"
    )]
    pub label: Option<String>,

    #[arg(
        long,
        help = "Comma-separated labels marking issues to ignore during processing"
    )]
    pub ignored_labels: Option<String>,

    #[arg(
        long,
        help = "Comma-separated title snippets marking issues to ignore during processing"
    )]
    pub ignored_titles: Option<String>,
}

fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

impl ApproveArgs {
    fn merge_into(&self, config: &mut BotConfig) {
        if let Some(phrase) = &self.phrase {
            config.phrase = Some(phrase.clone());
        }
        if !self.past_phrases.is_empty() {
            config.past_phrases = self.past_phrases.clone();
        }
        if let Some(reminder) = &self.reminder {
            config.reminder = Some(reminder.clone());
        }
        if let Some(closing) = &self.closing {
            config.closing = Some(closing.clone());
        }
        if let Some(closing_now) = &self.closing_now {
            config.closing_now = Some(closing_now.clone());
        }
        if self.close_directly {
            config.close_directly = Some(true);
        }
        if let Some(upgrade_hint) = &self.upgrade_hint {
            config.upgrade_hint = Some(upgrade_hint.clone());
        }
        if let Some(grace_period) = self.grace_period {
            config.grace_period = Some(grace_period);
        }
        if let Some(label) = &self.label {
            config.label = Some(label.clone());
        }
        if let Some(ignored_labels) = &self.ignored_labels {
            config.ignored_labels = split_comma_list(ignored_labels);
        }
        if let Some(ignored_titles) = &self.ignored_titles {
            config.ignored_titles = split_comma_list(ignored_titles);
        }
    }
}

#[derive(Debug, Args)]
pub struct AutolabelArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(
        short = 'm',
        long = "map",
        value_parser = parse_label_mapping,
        help = "Tag-to-label mapping in the form '<tag>=<label>'; repeatable"
    )]
    pub mappings: Vec<LabelMapping>,
}

impl AutolabelArgs {
    fn merge_into(&self, config: &mut BotConfig) {
        if !self.mappings.is_empty() {
            config.mappings = self.mappings.clone();
        }
    }
}

#[derive(Debug, Args)]
pub struct PrCheckArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(
        long = "target",
        help = "Target branch that pull requests must use; repeatable"
    )]
    pub targets: Vec<String>,

    #[arg(
        long = "notarget",
        help = "Target branch that pull requests must not use; repeatable"
    )]
    pub blacklisted_targets: Vec<String>,

    #[arg(
        long = "source",
        help = "Source branch that pull requests must use; repeatable"
    )]
    pub sources: Vec<String>,

    #[arg(
        long = "nosource",
        help = "Source branch that pull requests must not use; repeatable"
    )]
    pub blacklisted_sources: Vec<String>,

    #[arg(
        long,
        help = "Pattern the pull request title must match from the start; defaults to matching anything"
    )]
    pub title_pattern: Option<String>,

    #[arg(short = 'l', long, help = "Label applied to flagged pull requests")]
    pub label: Option<String>,

    #[arg(long, help = "Comment template wrapping the rendered problem list")]
    pub reminder: Option<String>,
}

impl PrCheckArgs {
    fn merge_into(&self, config: &mut BotConfig) {
        if !self.targets.is_empty() {
            config.targets = self.targets.clone();
        }
        if !self.blacklisted_targets.is_empty() {
            config.blacklisted_targets = self.blacklisted_targets.clone();
        }
        if !self.sources.is_empty() {
            config.sources = self.sources.clone();
        }
        if !self.blacklisted_sources.is_empty() {
            config.blacklisted_sources = self.blacklisted_sources.clone();
        }
        if let Some(title_pattern) = &self.title_pattern {
            config.title_pattern = Some(title_pattern.clone());
        }
        if let Some(label) = &self.label {
            config.label = Some(label.clone());
        }
        if let Some(reminder) = &self.reminder {
            config.reminder = Some(reminder.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use warden_config::BotConfig;

    use super::{split_comma_list, Cli, Command};

    #[test]
    fn unit_split_comma_list_trims_and_drops_empty_entries() {
        assert_eq!(
            split_comma_list(" bug , , feature request ,"),
            vec!["bug".to_string(), "feature request".to_string()]
        );
        assert!(split_comma_list("").is_empty());
    }

    #[test]
    fn functional_approve_flags_merge_over_file_config() {
        let cli = Cli::try_parse_from([
            "warden",
            "approve",
            "--token",
            "cli-token",
            "--repo",
            "acme/widgets",
            "--reminder",
            "please add details",
            "--grace",
            "-1",
            "--ignored-labels",
            "feature request,question",
            "--dry-run",
        ])
        .expect("parse");

        let mut config = BotConfig {
            token: Some("file-token".to_string()),
            phrase: Some("file phrase".to_string()),
            ..BotConfig::default()
        };
        cli.command.merge_into(&mut config);

        assert_eq!(config.token.as_deref(), Some("cli-token"));
        assert_eq!(config.phrase.as_deref(), Some("file phrase"));
        assert_eq!(config.grace_period, Some(-1));
        assert_eq!(
            config.ignored_labels,
            vec!["feature request".to_string(), "question".to_string()]
        );
        assert_eq!(config.dryrun, Some(true));
    }

    #[test]
    fn functional_absent_flags_keep_file_values() {
        let cli = Cli::try_parse_from(["warden", "approve"]).expect("parse");
        let mut config = BotConfig {
            dryrun: Some(true),
            ignore_case: Some(true),
            grace_period: Some(7),
            ..BotConfig::default()
        };
        cli.command.merge_into(&mut config);
        assert_eq!(config.dryrun, Some(true));
        assert_eq!(config.ignore_case, Some(true));
        assert_eq!(config.grace_period, Some(7));
    }

    #[test]
    fn functional_autolabel_parses_repeatable_mappings() {
        let cli = Cli::try_parse_from([
            "warden",
            "autolabel",
            "--map",
            "[Request]=feature request",
            "--map",
            "[Bug]=bug",
        ])
        .expect("parse");

        let Command::Autolabel(args) = &cli.command else {
            panic!("expected autolabel");
        };
        assert_eq!(args.mappings.len(), 2);
        assert_eq!(args.mappings[0].tag, "[Request]");
        assert_eq!(args.mappings[1].label, "bug");

        assert!(Cli::try_parse_from(["warden", "autolabel", "--map", "broken"]).is_err());
    }

    #[test]
    fn functional_prcheck_collects_branch_lists() {
        let cli = Cli::try_parse_from([
            "warden",
            "prcheck",
            "--target",
            "release",
            "--target",
            "hotfix",
            "--nosource",
            "main",
            "--title-pattern",
            r"\[\w+\]",
            "--ignore-case",
        ])
        .expect("parse");

        let mut config = BotConfig::default();
        cli.command.merge_into(&mut config);
        assert_eq!(config.targets, vec!["release".to_string(), "hotfix".to_string()]);
        assert_eq!(config.blacklisted_sources, vec!["main".to_string()]);
        assert_eq!(config.title_pattern.as_deref(), Some(r"\[\w+\]"));
        assert_eq!(config.ignore_case, Some(true));
    }

    #[test]
    fn unit_since_flag_rejects_garbage() {
        assert!(Cli::try_parse_from(["warden", "approve", "--since", "2026-01-15"]).is_ok());
        assert!(Cli::try_parse_from(["warden", "approve", "--since", "soonish"]).is_err());
    }
}

//! Grace-period decision rules for labeled and freshly reported issues.
//!
//! State is re-derived every run from the tracker's own label and
//! comment history; nothing per-issue is persisted locally.

use chrono::{DateTime, Duration, Utc};

use crate::models::Comment;

/// Slack added on top of the configured grace period before an issue
/// is auto-closed. The original tool disagreed with itself between
/// code paths; one day is the single tested value used everywhere.
pub const GRACE_CLOSE_SLACK_DAYS: i64 = 1;

/// What to do with one issue, derived from label state and validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueDisposition {
    /// Labeled issue now validates; remove the incomplete label.
    MarkValid,
    /// Labeled issue still invalid; look for the bot's last comment and
    /// close once the grace period has elapsed.
    CheckEscalation,
    /// New invalid issue; post the reminder and label it.
    Remind,
    /// New invalid issue with direct closing configured.
    CloseDirectly,
    /// Nothing to do this run.
    None,
}

/// Derives the per-issue disposition from already-established facts.
pub fn classify_issue(
    labeled: bool,
    valid: bool,
    created_after_watermark: bool,
    escalation_enabled: bool,
    close_directly: bool,
) -> IssueDisposition {
    if labeled {
        if valid {
            IssueDisposition::MarkValid
        } else if escalation_enabled {
            IssueDisposition::CheckEscalation
        } else {
            IssueDisposition::None
        }
    } else if created_after_watermark && !valid {
        if close_directly {
            IssueDisposition::CloseDirectly
        } else {
            IssueDisposition::Remind
        }
    } else {
        IssueDisposition::None
    }
}

/// Returns true when the grace period after the bot's comment has run
/// out: `now - (grace_days + 1 day)` is past the comment's timestamp.
pub fn grace_period_elapsed(
    now: DateTime<Utc>,
    grace_days: i64,
    bot_comment_at: DateTime<Utc>,
) -> bool {
    now - Duration::days(grace_days + GRACE_CLOSE_SLACK_DAYS) > bot_comment_at
}

/// The bot's most recent comment: last match by numeric id in server
/// order.
pub fn last_bot_comment(comments: &[Comment], bot_id: u64) -> Option<&Comment> {
    comments
        .iter()
        .filter(|comment| comment.author_id == bot_id)
        .last()
}

/// The `since` instant handed to retrieval. When escalation is active
/// it is pulled back to `now - grace_days` so that issues eligible for
/// closing are re-fetched even if older than the watermark.
pub fn effective_since(
    watermark: DateTime<Utc>,
    now: DateTime<Utc>,
    escalation_grace_days: Option<i64>,
) -> DateTime<Utc> {
    match escalation_grace_days {
        Some(days) => watermark.min(now - Duration::days(days)),
        None => watermark,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{
        classify_issue, effective_since, grace_period_elapsed, last_bot_comment, IssueDisposition,
    };
    use crate::models::Comment;

    fn comment(author_id: u64, day: u32) -> Comment {
        Comment {
            author_login: format!("user-{author_id}"),
            author_id,
            body: Some("please add the missing information".to_string()),
            created: Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn unit_classify_issue_covers_the_state_table() {
        assert_eq!(
            classify_issue(true, true, false, true, false),
            IssueDisposition::MarkValid
        );
        assert_eq!(
            classify_issue(true, false, false, true, false),
            IssueDisposition::CheckEscalation
        );
        assert_eq!(
            classify_issue(true, false, false, false, false),
            IssueDisposition::None
        );
        assert_eq!(
            classify_issue(false, false, true, true, false),
            IssueDisposition::Remind
        );
        assert_eq!(
            classify_issue(false, false, true, true, true),
            IssueDisposition::CloseDirectly
        );
        assert_eq!(
            classify_issue(false, true, true, true, false),
            IssueDisposition::None
        );
        assert_eq!(
            classify_issue(false, false, false, true, true),
            IssueDisposition::None
        );
    }

    #[test]
    fn functional_grace_period_elapsed_uses_one_day_slack() {
        let commented = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let grace = 14;

        let just_before = commented + Duration::days(grace + 1);
        assert!(!grace_period_elapsed(just_before, grace, commented));

        let just_after = commented + Duration::days(grace + 1) + Duration::seconds(1);
        assert!(grace_period_elapsed(just_after, grace, commented));
    }

    #[test]
    fn unit_last_bot_comment_takes_last_match_in_server_order() {
        let comments = vec![comment(99, 1), comment(42, 2), comment(7, 3), comment(99, 4)];
        let found = last_bot_comment(&comments, 99).expect("bot comment");
        assert_eq!(found.created, comments[3].created);
        assert!(last_bot_comment(&comments, 1).is_none());
    }

    #[test]
    fn functional_effective_since_takes_earlier_of_watermark_and_grace_floor() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let recent_watermark = now - Duration::days(2);
        let old_watermark = now - Duration::days(30);

        assert_eq!(
            effective_since(recent_watermark, now, Some(14)),
            now - Duration::days(14)
        );
        assert_eq!(effective_since(old_watermark, now, Some(14)), old_watermark);
        assert_eq!(effective_since(recent_watermark, now, None), recent_watermark);
    }
}

//! Smart folders: saved rule sets evaluated against follow-ups.
//!
//! Rules are stored as JSON, for example:
//!
//! ```json
//! {
//!   "match": "all",
//!   "conditions": [
//!     { "field": "status", "value": ["due", "overdue"] },
//!     { "field": "contact_email", "op": "ends_with", "value": "@acme.com" }
//!   ]
//! }
//! ```

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::followup::{Followup, FollowupPriority, FollowupStatus};
use crate::domain::types::{FolderName, OrganizationId, SmartFolderId, TypeConstraintError, UserId};

pub const MAX_CONDITIONS: usize = 20;
/// Upper bound for `due_within_days` and `overdue_by_days`, about a century.
pub const MAX_DAY_OFFSET: i64 = 36_500;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    All,
    Any,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextOp {
    Contains,
    Equals,
    StartsWith,
    EndsWith,
}

impl TextOp {
    /// Case-insensitive comparison of `haystack` against `needle`.
    fn apply(self, haystack: &str, needle: &str) -> bool {
        let haystack = haystack.to_lowercase();
        let needle = needle.to_lowercase();
        match self {
            TextOp::Contains => haystack.contains(&needle),
            TextOp::Equals => haystack == needle,
            TextOp::StartsWith => haystack.starts_with(&needle),
            TextOp::EndsWith => haystack.ends_with(&needle),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CountOp {
    Eq,
    Gte,
    Lte,
}

impl CountOp {
    fn apply(self, actual: i32, expected: i32) -> bool {
        match self {
            CountOp::Eq => actual == expected,
            CountOp::Gte => actual >= expected,
            CountOp::Lte => actual <= expected,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", rename_all = "snake_case", deny_unknown_fields)]
pub enum Condition {
    Status { value: Vec<FollowupStatus> },
    Priority { value: Vec<FollowupPriority> },
    Subject { op: TextOp, value: String },
    ContactEmail { op: TextOp, value: String },
    DueWithinDays { value: i64 },
    OverdueByDays { value: i64 },
    SnoozeCount { op: CountOp, value: i32 },
    HasDraft { value: bool },
}

/// Everything a condition can look at for one follow-up.
#[derive(Clone, Copy, Debug)]
pub struct FollowupFacts<'a> {
    pub followup: &'a Followup,
    pub status: FollowupStatus,
    pub contact_email: Option<&'a str>,
}

impl Condition {
    fn validate(&self) -> Result<(), TypeConstraintError> {
        match self {
            Condition::Status { value } if value.is_empty() => Err(
                TypeConstraintError::InvalidValue("status list cannot be empty".to_string()),
            ),
            Condition::Priority { value } if value.is_empty() => Err(
                TypeConstraintError::InvalidValue("priority list cannot be empty".to_string()),
            ),
            Condition::Subject { value, .. } | Condition::ContactEmail { value, .. }
                if value.trim().is_empty() =>
            {
                Err(TypeConstraintError::EmptyString)
            }
            Condition::DueWithinDays { value } | Condition::OverdueByDays { value }
                if !(0..=MAX_DAY_OFFSET).contains(value) =>
            {
                Err(TypeConstraintError::InvalidValue(format!(
                    "day offsets must be between 0 and {MAX_DAY_OFFSET}"
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn matches(&self, facts: &FollowupFacts<'_>, now: NaiveDateTime) -> bool {
        let followup = facts.followup;
        match self {
            Condition::Status { value } => value.contains(&facts.status),
            Condition::Priority { value } => value.contains(&followup.priority),
            Condition::Subject { op, value } => op.apply(followup.subject.as_str(), value.trim()),
            Condition::ContactEmail { op, value } => facts
                .contact_email
                .is_some_and(|email| op.apply(email, value.trim())),
            // Offsets outside the calendar never match.
            Condition::DueWithinDays { value } => {
                followup.is_open()
                    && Duration::try_days(*value)
                        .and_then(|offset| now.checked_add_signed(offset))
                        .is_some_and(|limit| followup.due_at <= limit)
            }
            Condition::OverdueByDays { value } => {
                followup.is_open()
                    && Duration::try_days(*value)
                        .and_then(|offset| now.checked_sub_signed(offset))
                        .is_some_and(|limit| followup.due_at <= limit)
            }
            Condition::SnoozeCount { op, value } => op.apply(followup.snooze_count, *value),
            Condition::HasDraft { value } => followup.draft.is_some() == *value,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FolderRules {
    #[serde(rename = "match", default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl FolderRules {
    /// Parses and validates a JSON rule object.
    pub fn parse(raw: &str) -> Result<Self, TypeConstraintError> {
        let rules: FolderRules = serde_json::from_str(raw)
            .map_err(|e| TypeConstraintError::InvalidValue(format!("invalid rules: {e}")))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), TypeConstraintError> {
        if self.conditions.len() > MAX_CONDITIONS {
            return Err(TypeConstraintError::InvalidValue(format!(
                "at most {MAX_CONDITIONS} conditions are allowed"
            )));
        }
        self.conditions.iter().try_for_each(Condition::validate)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// `all` with no conditions matches everything; `any` with none matches nothing.
    pub fn matches(&self, facts: &FollowupFacts<'_>, now: NaiveDateTime) -> bool {
        match self.match_mode {
            MatchMode::All => self.conditions.iter().all(|c| c.matches(facts, now)),
            MatchMode::Any => self.conditions.iter().any(|c| c.matches(facts, now)),
        }
    }

    /// Folders seeded for every new organization.
    pub fn seeded_folders() -> Vec<(&'static str, FolderRules)> {
        vec![
            (
                "Overdue",
                FolderRules {
                    match_mode: MatchMode::All,
                    conditions: vec![Condition::Status {
                        value: vec![FollowupStatus::Overdue],
                    }],
                },
            ),
            (
                "Due soon",
                FolderRules {
                    match_mode: MatchMode::All,
                    conditions: vec![Condition::Status {
                        value: vec![FollowupStatus::Due],
                    }],
                },
            ),
            (
                "High priority",
                FolderRules {
                    match_mode: MatchMode::All,
                    conditions: vec![
                        Condition::Priority {
                            value: vec![FollowupPriority::High],
                        },
                        Condition::Status {
                            value: vec![
                                FollowupStatus::Pending,
                                FollowupStatus::Due,
                                FollowupStatus::Overdue,
                            ],
                        },
                    ],
                },
            ),
        ]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SmartFolder {
    pub id: SmartFolderId,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub name: FolderName,
    pub rules: FolderRules,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewSmartFolder {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub name: FolderName,
    pub rules: FolderRules,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateSmartFolder {
    pub name: FolderName,
    pub rules: FolderRules,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::followup::tests::{at, sample_followup};

    fn facts<'a>(
        followup: &'a Followup,
        status: FollowupStatus,
        email: Option<&'a str>,
    ) -> FollowupFacts<'a> {
        FollowupFacts {
            followup,
            status,
            contact_email: email,
        }
    }

    #[test]
    fn parses_rule_json() {
        let rules = FolderRules::parse(
            r#"{"match":"any","conditions":[
                {"field":"status","value":["due","overdue"]},
                {"field":"contact_email","op":"ends_with","value":"@acme.com"},
                {"field":"snooze_count","op":"gte","value":2}
            ]}"#,
        )
        .unwrap();

        assert_eq!(rules.match_mode, MatchMode::Any);
        assert_eq!(rules.conditions.len(), 3);
    }

    #[test]
    fn rejects_unknown_fields_and_bad_values() {
        assert!(FolderRules::parse(r#"{"conditions":[{"field":"color","value":"red"}]}"#).is_err());
        assert!(FolderRules::parse(r#"{"conditions":[{"field":"status","value":[]}]}"#).is_err());
        assert!(
            FolderRules::parse(r#"{"conditions":[{"field":"due_within_days","value":-1}]}"#)
                .is_err()
        );
        assert!(FolderRules::parse("not json").is_err());

        let too_many = (0..=MAX_CONDITIONS)
            .map(|_| r#"{"field":"has_draft","value":true}"#)
            .collect::<Vec<_>>()
            .join(",");
        assert!(FolderRules::parse(&format!(r#"{{"conditions":[{too_many}]}}"#)).is_err());
    }

    #[test]
    fn empty_rules_follow_match_mode() {
        let followup = sample_followup(at(12));
        let f = facts(&followup, FollowupStatus::Pending, None);

        assert!(FolderRules::default().matches(&f, at(10)));
        let any = FolderRules {
            match_mode: MatchMode::Any,
            conditions: vec![],
        };
        assert!(!any.matches(&f, at(10)));
    }

    #[test]
    fn text_conditions_are_case_insensitive() {
        let followup = sample_followup(at(12));
        let f = facts(&followup, FollowupStatus::Pending, Some("bob@ACME.com"));

        let rules = FolderRules {
            match_mode: MatchMode::All,
            conditions: vec![
                Condition::ContactEmail {
                    op: TextOp::EndsWith,
                    value: "@acme.com".to_string(),
                },
                Condition::Subject {
                    op: TextOp::Contains,
                    value: "QUO".to_string(),
                },
            ],
        };
        assert!(rules.matches(&f, at(10)));

        let without_contact = facts(&followup, FollowupStatus::Pending, None);
        assert!(!rules.matches(&without_contact, at(10)));
    }

    #[test]
    fn date_conditions_only_match_open_followups() {
        let mut followup = sample_followup(at(9));
        let now = at(10);
        let due_today = Condition::DueWithinDays { value: 0 };
        let overdue = Condition::OverdueByDays { value: 0 };

        assert!(due_today.matches(&facts(&followup, FollowupStatus::Overdue, None), now));
        assert!(overdue.matches(&facts(&followup, FollowupStatus::Overdue, None), now));

        followup
            .complete(crate::domain::followup::CompletionReason::Manual, now)
            .unwrap();
        assert!(!due_today.matches(&facts(&followup, FollowupStatus::Completed, None), now));
    }

    #[test]
    fn day_offsets_are_capped() {
        let rules = |field: &str, value: i64| {
            format!(r#"{{"conditions":[{{"field":"{field}","value":{value}}}]}}"#)
        };

        assert!(FolderRules::parse(&rules("due_within_days", MAX_DAY_OFFSET)).is_ok());
        assert!(FolderRules::parse(&rules("due_within_days", MAX_DAY_OFFSET + 1)).is_err());
        assert!(FolderRules::parse(&rules("overdue_by_days", i64::MAX)).is_err());
    }

    #[test]
    fn out_of_range_day_offsets_do_not_match() {
        let followup = sample_followup(at(9));
        let f = facts(&followup, FollowupStatus::Overdue, None);

        for value in [i64::MAX, i64::MIN, 200_000_000] {
            assert!(!Condition::DueWithinDays { value }.matches(&f, at(10)));
            assert!(!Condition::OverdueByDays { value }.matches(&f, at(10)));
        }
    }

    #[test]
    fn seeded_folders_are_valid() {
        for (name, rules) in FolderRules::seeded_folders() {
            assert!(FolderName::new(name).is_ok());
            assert!(rules.validate().is_ok());
            assert_eq!(FolderRules::parse(&rules.to_json()).unwrap(), rules);
        }
    }
}

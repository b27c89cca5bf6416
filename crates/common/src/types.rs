use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member's stored group labels.
///
/// Older records hold a single comma-separated string; newer ones hold an
/// array. Both are accepted wherever groups are read. Any other stored shape
/// decodes to no groups, and non-string array entries are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MemberGroups {
    List(Vec<String>),
    Text(String),
}

impl MemberGroups {
    /// Raw (un-normalized) group labels. A `Text` value is split on commas.
    pub fn labels(&self) -> Vec<&str> {
        match self {
            MemberGroups::List(groups) => groups.iter().map(String::as_str).collect(),
            MemberGroups::Text(text) => text.split(',').collect(),
        }
    }
}

impl<'de> Deserialize<'de> for MemberGroups {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde_json::Value;

        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => MemberGroups::Text(text),
            Value::Array(items) => MemberGroups::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(label) => Some(label),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => MemberGroups::default(),
        })
    }
}

impl Default for MemberGroups {
    fn default() -> Self {
        MemberGroups::List(Vec::new())
    }
}

impl From<Vec<&str>> for MemberGroups {
    fn from(groups: Vec<&str>) -> Self {
        MemberGroups::List(groups.into_iter().map(str::to_string).collect())
    }
}

/// A congregation member. Owned by the member store; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    #[sqlx(json)]
    #[serde(default)]
    pub groups: MemberGroups,
    pub is_approved: bool,
}

impl Member {
    /// Approved members with a phone number containing at least one digit.
    pub fn is_sms_eligible(&self) -> bool {
        self.is_approved
            && self
                .phone_number
                .as_deref()
                .is_some_and(|p| p.chars().any(|c| c.is_ascii_digit()))
    }
}

/// A published announcement.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    /// Free-text audience: `website` or a comma-separated list of groups.
    pub target_groups: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of one SMS send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RecipientOutcome {
    Success { message_id: String },
    Failure { reason: String },
}

impl RecipientOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RecipientOutcome::Success { .. })
    }
}

/// Per-recipient entry of a [`DispatchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientResult {
    pub member_name: String,
    /// Normalized number the send was addressed to (raw number if it could not be normalized).
    pub phone_number: String,
    pub outcome: RecipientOutcome,
}

/// Aggregate outcome of one dispatch call. Never persisted.
///
/// `success` means the dispatch ran to completion; individual delivery
/// failures are counted in `failed` and detailed in `per_recipient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success: bool,
    pub sent: usize,
    pub failed: usize,
    pub per_recipient: Vec<RecipientResult>,
}

impl DispatchResult {
    pub fn empty() -> Self {
        Self::from_results(Vec::new())
    }

    /// Build the aggregate from per-recipient results, keeping their order.
    pub fn from_results(per_recipient: Vec<RecipientResult>) -> Self {
        let sent = per_recipient
            .iter()
            .filter(|r| r.outcome.is_success())
            .count();
        let failed = per_recipient.len() - sent;

        Self {
            success: true,
            sent,
            failed,
            per_recipient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(phone: Option<&str>, approved: bool) -> Member {
        Member {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            phone_number: phone.map(str::to_string),
            groups: MemberGroups::default(),
            is_approved: approved,
        }
    }

    #[test]
    fn test_groups_deserialize_from_array_or_string() {
        let list: MemberGroups = serde_json::from_value(serde_json::json!(["Choir", "Youth"])).unwrap();
        assert_eq!(list.labels(), vec!["Choir", "Youth"]);

        let text: MemberGroups = serde_json::from_value(serde_json::json!("Choir, Youth")).unwrap();
        assert_eq!(text.labels(), vec!["Choir", " Youth"]);
    }

    #[test]
    fn test_groups_tolerate_malformed_json() {
        let null: MemberGroups = serde_json::from_value(serde_json::json!(null)).unwrap();
        assert_eq!(null, MemberGroups::default());

        let mixed: MemberGroups =
            serde_json::from_value(serde_json::json!(["Choir", 7, null, {"x": 1}, "Ushers"]))
                .unwrap();
        assert_eq!(mixed.labels(), vec!["Choir", "Ushers"]);

        let number: MemberGroups = serde_json::from_value(serde_json::json!(42)).unwrap();
        assert!(number.labels().is_empty());
    }

    #[test]
    fn test_member_without_groups_field() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "name": "Ann",
            "phone_number": "555-1111",
            "is_approved": true,
        }))
        .unwrap();
        assert_eq!(member.groups, MemberGroups::default());
    }

    #[test]
    fn test_sms_eligibility() {
        assert!(member(Some("555-1111"), true).is_sms_eligible());
        assert!(!member(Some("555-1111"), false).is_sms_eligible());
        assert!(!member(Some(""), true).is_sms_eligible());
        assert!(!member(Some("n/a"), true).is_sms_eligible());
        assert!(!member(None, true).is_sms_eligible());
    }

    #[test]
    fn test_dispatch_result_counts() {
        let result = DispatchResult::from_results(vec![
            RecipientResult {
                member_name: "A".to_string(),
                phone_number: "+15551111".to_string(),
                outcome: RecipientOutcome::Success {
                    message_id: "SM1".to_string(),
                },
            },
            RecipientResult {
                member_name: "B".to_string(),
                phone_number: "+15552222".to_string(),
                outcome: RecipientOutcome::Failure {
                    reason: "unreachable".to_string(),
                },
            },
        ]);
        assert!(result.success);
        assert_eq!(result.sent, 1);
        assert_eq!(result.failed, 1);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(RecipientOutcome::Failure {
            reason: "bad number".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"status": "failure", "reason": "bad number"}));
    }
}

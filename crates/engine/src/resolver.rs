//! Group resolver — decides which members receive an announcement text.
//!
//! The operator types a free-text audience ("Youth Group, Website") and
//! members carry free-text group labels, so matching is deliberately lenient.
//! Each target/member label pair is tried against a ladder of rules, first
//! hit wins:
//! 1. exact match after normalization
//! 2. word-for-word match where words may differ by one trailing `s`
//! 3. either label contains the other
//!
//! Irregular plurals only match through rule 3, which also lets "men" match
//! "women". Known imprecision, kept for compatibility with existing labels.

use vestry_common::types::Member;

/// Audience token meaning "post on the website only".
pub const WEBSITE_TARGET: &str = "website";

const APOSTROPHES: &[char] = &['\'', '\u{2018}', '\u{2019}', '\u{02BC}'];

/// Which rung of the ladder produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Exact,
    WordPlural,
    Substring,
}

/// Parsed audience of an announcement: normalized group names, `website` removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSpec {
    groups: Vec<String>,
}

impl TargetSpec {
    pub fn parse(text: &str) -> Self {
        let groups = normalized_labels(text.split(','))
            .filter(|g| g != WEBSITE_TARGET)
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// True for a blank audience or one naming only `website`.
    pub fn is_website_only(text: &str) -> bool {
        Self::parse(text).is_empty()
    }
}

/// Stateless resolver from audience text to recipients.
pub struct GroupResolver;

impl GroupResolver {
    /// Select the members who should receive a text for `target_text`,
    /// preserving input order.
    pub fn resolve(target_text: &str, members: Vec<Member>) -> Vec<Member> {
        let spec = TargetSpec::parse(target_text);
        if spec.is_empty() {
            tracing::debug!(
                target_groups = target_text,
                "No SMS groups in target; nothing to resolve"
            );
            return Vec::new();
        }

        let considered = members.len();
        let selected: Vec<Member> = members
            .into_iter()
            .filter(|m| Self::member_matches(&spec, m))
            .collect();

        tracing::debug!(
            target_groups = target_text,
            considered,
            selected = selected.len(),
            "Resolved announcement recipients"
        );

        selected
    }

    /// Whether an eligible member belongs to any of the targeted groups.
    pub fn member_matches(spec: &TargetSpec, member: &Member) -> bool {
        if !member.is_sms_eligible() {
            return false;
        }

        let member_groups: Vec<String> =
            normalized_labels(member.groups.labels().into_iter()).collect();

        spec.groups().iter().any(|target| {
            member_groups
                .iter()
                .any(|group| Self::match_rule(target, group).is_some())
        })
    }

    /// Evaluate the matching ladder for two already-normalized labels.
    pub fn match_rule(target: &str, group: &str) -> Option<MatchRule> {
        if target == group {
            return Some(MatchRule::Exact);
        }
        if words_match_ignoring_plural(target, group) {
            return Some(MatchRule::WordPlural);
        }
        if target.contains(group) || group.contains(target) {
            return Some(MatchRule::Substring);
        }
        None
    }

    /// Lower-case, drop apostrophes, collapse whitespace runs, trim.
    pub fn normalize_group(label: &str) -> String {
        label
            .to_lowercase()
            .replace(APOSTROPHES, "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Normalize labels and drop those with nothing to match on.
fn normalized_labels<'a>(labels: impl Iterator<Item = &'a str>) -> impl Iterator<Item = String> {
    labels
        .map(GroupResolver::normalize_group)
        .filter(|label| label.chars().any(char::is_alphanumeric))
}

fn words_match_ignoring_plural(a: &str, b: &str) -> bool {
    let a_words: Vec<&str> = a.split(' ').collect();
    let b_words: Vec<&str> = b.split(' ').collect();

    a_words.len() == b_words.len()
        && a_words
            .iter()
            .zip(&b_words)
            .all(|(x, y)| x == y || singular_equal(x, y))
}

/// Equal after stripping one trailing `s` from each side; the stem must be
/// longer than two characters so "is" and "i" stay distinct.
fn singular_equal(a: &str, b: &str) -> bool {
    let a = a.strip_suffix('s').unwrap_or(a);
    let b = b.strip_suffix('s').unwrap_or(b);
    a == b && a.chars().count() > 2
}

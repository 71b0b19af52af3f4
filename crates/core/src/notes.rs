//! Project notes with `@user` mentions.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

// An @ glued to a word character (as in an email address) is not a mention.
static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w@])@(\w[\w.-]*)").expect("mention pattern is valid")
});

/// Usernames mentioned in `body`, in first-seen order without duplicates.
///
/// Matching is case-insensitive for de-duplication; the first spelling wins.
/// Trailing `.` and `-` are treated as punctuation, not part of the name.
pub fn parse_mentions(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut mentions = Vec::new();
    for captures in MENTION.captures_iter(body) {
        let name = captures[1].trim_end_matches(['.', '-']);
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.to_lowercase()) {
            mentions.push(name.to_owned());
        }
    }
    mentions
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNote {
    pub id: String,
    pub project_id: String,
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub mentions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ProjectNote {
    pub fn new(project_id: impl Into<String>, author: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            author: author.into(),
            mentions: parse_mentions(&body),
            body,
            created_at: Utc::now(),
        }
    }

    pub fn mentions_user(&self, username: &str) -> bool {
        self.mentions.iter().any(|m| m.eq_ignore_ascii_case(username))
    }

    /// Mentioned names that are members of the project, in mention order.
    pub fn resolve_mentions<'a>(&self, members: &'a [String]) -> Vec<&'a str> {
        self.mentions
            .iter()
            .filter_map(|m| members.iter().find(|member| member.eq_ignore_ascii_case(m)))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_mentions_in_order() {
        assert_eq!(parse_mentions("@alex please check with @sam_b"), vec!["alex", "sam_b"]);
    }

    #[test]
    fn skips_email_addresses() {
        assert_eq!(parse_mentions("mail bob@example.com or ping @bob"), vec!["bob"]);
    }

    #[test]
    fn strips_trailing_punctuation() {
        assert_eq!(parse_mentions("Thanks @j.doe. Also (@kim-lee)-"), vec!["j.doe", "kim-lee"]);
    }

    #[test]
    fn dedupes_case_insensitively() {
        assert_eq!(parse_mentions("@Alex @alex @ALEX"), vec!["Alex"]);
    }

    #[test]
    fn lone_at_sign_is_not_a_mention() {
        assert!(parse_mentions("meet @ 5pm, @@").is_empty());
    }

    #[test]
    fn note_resolves_members() {
        let note = ProjectNote::new("p1", "sam", "cc @Alex and @ghost");
        assert_eq!(note.mentions, vec!["Alex", "ghost"]);
        assert!(note.mentions_user("alex"));
        assert!(!note.mentions_user("sam"));

        let members = vec!["sam".to_owned(), "alex".to_owned()];
        assert_eq!(note.resolve_mentions(&members), vec!["alex"]);
    }
}

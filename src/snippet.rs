//! Snippet data model.
//!
//! Contains the stored snippet record, the language tag and the payloads
//! sent to the tables API for inserts and partial updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Number of code characters shown in a card preview.
pub const PREVIEW_CHARS: usize = 200;

/// Number of tags shown on a card before collapsing into "+N".
pub const VISIBLE_TAGS: usize = 3;

/// Language tag of a snippet.
///
/// Selects the badge colour and export extension. The backend does not
/// validate this column, so unknown values are kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    #[default]
    JavaScript,
    Python,
    Java,
    Cpp,
    C,
    Html,
    Css,
    Sql,
    Other(String),
}

impl Language {
    /// Every language offered in the editor and filter, in display order.
    pub const ALL: [Language; 8] = [
        Language::JavaScript,
        Language::Python,
        Language::Java,
        Language::Cpp,
        Language::C,
        Language::Html,
        Language::Css,
        Language::Sql,
    ];

    /// Stored value of the language column.
    pub fn as_str(&self) -> &str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Html => "html",
            Language::Css => "css",
            Language::Sql => "sql",
            Language::Other(value) => value,
        }
    }

    /// Human readable label. Unknown languages fall back to their raw value.
    pub fn label(&self) -> &str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::C => "C",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Sql => "SQL",
            Language::Other(value) => value,
        }
    }

    /// Short icon text shown next to the label in the language picker.
    pub fn icon(&self) -> &str {
        match self {
            Language::JavaScript => "JS",
            Language::Python => "PY",
            Language::Java => "JV",
            Language::Cpp => "C++",
            Language::C => "C",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Sql => "SQL",
            Language::Other(_) => "?",
        }
    }

    /// File extension used when exporting a snippet.
    pub fn extension(&self) -> &str {
        match self {
            Language::JavaScript => "js",
            Language::Python => "py",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Html => "html",
            Language::Css => "css",
            Language::Sql => "sql",
            Language::Other(_) => "txt",
        }
    }

    fn position(&self) -> Option<usize> {
        Self::ALL.iter().position(|lang| lang == self)
    }

    /// Next language in `ALL`, wrapping around.
    ///
    /// # Details
    /// An unknown language moves to the first known one.
    pub fn next(&self) -> Language {
        match self.position() {
            Some(i) => Self::ALL[(i + 1) % Self::ALL.len()].clone(),
            None => Self::ALL[0].clone(),
        }
    }

    /// Previous language in `ALL`, wrapping around.
    pub fn previous(&self) -> Language {
        match self.position() {
            Some(0) | None => Self::ALL[Self::ALL.len() - 1].clone(),
            Some(i) => Self::ALL[i - 1].clone(),
        }
    }
}

impl From<String> for Language {
    fn from(value: String) -> Self {
        Self::ALL
            .iter()
            .find(|lang| lang.as_str() == value)
            .cloned()
            .unwrap_or(Language::Other(value))
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.as_str().to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stored code snippet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snippet {
    /// Identifier assigned by the backend
    pub id: String,
    /// Owner identifier assigned by the backend
    pub user_id: String,
    /// Snippet title
    pub title: String,
    /// Language tag
    pub language: Language,
    /// Code text
    pub code: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Free-text tags
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    /// Pinned flag
    #[serde(default)]
    pub is_favorite: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Snippet {
    /// Code preview for cards.
    ///
    /// # Returns
    /// * `String` - First 200 characters, followed by "..." when truncated
    pub fn code_preview(&self) -> String {
        let mut preview: String = self.code.chars().take(PREVIEW_CHARS).collect();
        if self.code.chars().count() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        preview
    }

    /// Tags shown on a card and how many were left out.
    pub fn visible_tags(&self) -> (&[String], usize) {
        let shown = self.tags.len().min(VISIBLE_TAGS);
        (&self.tags[..shown], self.tags.len() - shown)
    }

    /// Whether the snippet was changed after it was created.
    pub fn was_edited(&self) -> bool {
        self.updated_at != self.created_at
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Insert payload for a new snippet.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewSnippet {
    pub user_id: String,
    pub title: String,
    pub language: Language,
    pub code: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
}

/// User-editable snippet content, as produced by the editor form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetDraft {
    pub title: String,
    pub language: Language,
    pub code: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
}

impl SnippetDraft {
    /// Attach the owner to build an insert payload.
    pub fn into_new(self, user_id: &str) -> NewSnippet {
        NewSnippet {
            user_id: user_id.to_string(),
            title: self.title,
            language: self.language,
            code: self.code,
            description: self.description,
            tags: self.tags,
            is_favorite: self.is_favorite,
        }
    }
}

/// Partial update payload. Fields left as `None` are not sent.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SnippetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// `Some(None)` clears the description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl SnippetPatch {
    /// Patch touching only the favorite flag.
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::default()
        }
    }
}

impl From<SnippetDraft> for SnippetPatch {
    fn from(draft: SnippetDraft) -> Self {
        Self {
            title: Some(draft.title),
            language: Some(draft.language),
            code: Some(draft.code),
            description: Some(draft.description),
            tags: Some(draft.tags),
            is_favorite: Some(draft.is_favorite),
        }
    }
}

/// Format a timestamp relative to `now`.
///
/// # Arguments
/// * `at` - Timestamp to describe
/// * `now` - Reference time
///
/// # Returns
/// * `String` - e.g. "just now", "5 minutes ago", "about 2 hours ago", "3 days ago"
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let months = days / 30;
    let years = days / 365;

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };

    if seconds < 45 {
        "just now".to_string()
    } else if minutes < 45 {
        format!("{} ago", plural(minutes.max(1), "minute"))
    } else if hours < 24 {
        format!("about {} ago", plural(hours.max(1), "hour"))
    } else if days < 30 {
        format!("{} ago", plural(days, "day"))
    } else if months < 12 {
        format!("about {} ago", plural(months, "month"))
    } else {
        format!("over {} ago", plural(years.max(1), "year"))
    }
}

#[cfg(test)]
pub(crate) fn test_snippet(id: &str, title: &str, created_at: DateTime<Utc>) -> Snippet {
    Snippet {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        title: title.to_string(),
        language: Language::JavaScript,
        code: "fn main() {}".to_string(),
        description: None,
        tags: Vec::new(),
        is_favorite: false,
        created_at,
        updated_at: created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_language_round_trip() {
        let lang: Language = serde_json::from_str("\"cpp\"").unwrap();
        assert_eq!(lang, Language::Cpp);
        assert_eq!(lang.label(), "C++");
        assert_eq!(serde_json::to_string(&lang).unwrap(), "\"cpp\"");
    }

    #[test]
    fn test_unknown_language_is_preserved() {
        let lang: Language = serde_json::from_str("\"haskell\"").unwrap();
        assert_eq!(lang, Language::Other("haskell".to_string()));
        assert_eq!(lang.label(), "haskell");
        assert_eq!(lang.extension(), "txt");
        assert_eq!(serde_json::to_string(&lang).unwrap(), "\"haskell\"");
    }

    #[test]
    fn test_language_cycling_wraps() {
        assert_eq!(Language::Sql.next(), Language::JavaScript);
        assert_eq!(Language::JavaScript.previous(), Language::Sql);
        assert_eq!(Language::Other("go".into()).next(), Language::JavaScript);
    }

    #[test]
    fn test_snippet_deserializes_null_tags() {
        let json = r#"{
            "id": "a1",
            "user_id": "u1",
            "title": "Binary search",
            "language": "python",
            "code": "def f(): pass",
            "description": null,
            "tags": null,
            "is_favorite": true,
            "created_at": "2024-01-15T10:00:00+00:00",
            "updated_at": "2024-01-15T10:00:00+00:00"
        }"#;
        let snippet: Snippet = serde_json::from_str(json).unwrap();
        assert!(snippet.tags.is_empty());
        assert_eq!(snippet.language, Language::Python);
        assert!(snippet.is_favorite);
        assert!(!snippet.was_edited());
    }

    #[test]
    fn test_code_preview_truncates() {
        let now = Utc::now();
        let mut snippet = test_snippet("1", "Long", now);
        snippet.code = "x".repeat(250);
        let preview = snippet.code_preview();
        assert_eq!(preview.len(), 203);
        assert!(preview.ends_with("..."));

        snippet.code = "short".to_string();
        assert_eq!(snippet.code_preview(), "short");
    }

    #[test]
    fn test_visible_tags_overflow() {
        let mut snippet = test_snippet("1", "Tags", Utc::now());
        snippet.tags = vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()];
        let (shown, rest) = snippet.visible_tags();
        assert_eq!(shown.len(), 3);
        assert_eq!(rest, 2);
    }

    #[test]
    fn test_favorite_patch_only_sends_flag() {
        let json = serde_json::to_value(SnippetPatch::favorite(true)).unwrap();
        assert_eq!(json, serde_json::json!({ "is_favorite": true }));
    }

    #[test]
    fn test_patch_can_clear_description() {
        let patch = SnippetPatch {
            description: Some(None),
            ..SnippetPatch::default()
        };
        let json = serde_json::to_value(patch).unwrap();
        assert_eq!(json, serde_json::json!({ "description": null }));
    }

    #[test]
    fn test_format_relative() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(format_relative(now, now), "just now");
        assert_eq!(format_relative(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_relative(now - Duration::hours(2), now), "about 2 hours ago");
        assert_eq!(format_relative(now - Duration::days(1), now), "1 day ago");
        assert_eq!(format_relative(now - Duration::days(65), now), "about 2 months ago");
        assert_eq!(format_relative(now - Duration::days(800), now), "over 2 years ago");
    }
}

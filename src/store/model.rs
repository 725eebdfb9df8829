use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const UNTITLED_NOTE: &str = "Untitled Note";
pub const NEW_NOTE_CONTENT: &str = "<p>Start your masterpiece...</p>";
pub const DEFAULT_FOLDER_NAME: &str = "My First Folder";
pub const NEW_FOLDER_NAME: &str = "New Folder";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(String);

impl NoteId {
    pub fn generate() -> Self {
        Self(format!("n-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(String);

impl FolderId {
    pub fn generate() -> Self {
        Self(format!("f-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FolderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A titled rich-text document. `content` holds HTML.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub folder_id: FolderId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(folder_id: FolderId) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::generate(),
            title: UNTITLED_NOTE.to_string(),
            content: NEW_NOTE_CONTENT.to_string(),
            folder_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.touch_at(Utc::now());
    }

    /// Never moves `updated_at` behind `created_at`, even if the clock stepped back.
    pub fn touch_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FolderId::generate(),
            name: name.into(),
        }
    }
}

/// Subscription tier. Shown in the profile panel, never checked against features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Plan {
    Spark,
    #[default]
    Creator,
    Zenith,
}

impl Plan {
    pub fn name(&self) -> &'static str {
        match self {
            Plan::Spark => "Spark",
            Plan::Creator => "Creator",
            Plan::Zenith => "Zenith",
        }
    }

    pub fn price(&self) -> &'static str {
        match self {
            Plan::Spark => "$0",
            Plan::Creator => "$8",
            Plan::Zenith => "$16",
        }
    }

    pub fn price_period(&self) -> &'static str {
        match self {
            Plan::Spark => "forever",
            Plan::Creator | Plan::Zenith => "/ month",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub plan: Plan,
}

impl User {
    pub fn initial(&self) -> char {
        self.name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: "u1".to_string(),
            name: "Alex".to_string(),
            email: "alex@example.com".to_string(),
            plan: Plan::Creator,
        }
    }
}

/// A note paired with its plain-text preview. Computed on read, never stored.
#[derive(Debug, Clone)]
pub struct NoteSnippet<'a> {
    pub note: &'a Note,
    pub snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = NoteId::generate();
        let b = NoteId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("n-"));
        assert!(FolderId::generate().as_str().starts_with("f-"));
    }

    #[test]
    fn test_touch_never_precedes_creation() {
        let mut note = Note::new(FolderId::from("f1"));
        let earlier = note.created_at - Duration::seconds(30);
        note.touch_at(earlier);
        assert_eq!(note.updated_at, note.created_at);

        let later = note.created_at + Duration::seconds(30);
        note.touch_at(later);
        assert_eq!(note.updated_at, later);
    }

    #[test]
    fn test_user_initial() {
        let mut user = User::default();
        assert_eq!(user.initial(), 'A');
        user.name = "zoe".to_string();
        assert_eq!(user.initial(), 'Z');
        user.name.clear();
        assert_eq!(user.initial(), '?');
    }
}

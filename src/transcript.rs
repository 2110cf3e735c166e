//! Session transcript store
//!
//! The ordered, append-only log of chat entries for one session. Insertion
//! order is display order is conversational order. Entries are never edited
//! or removed once appended.

use crate::format::format_message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a transcript entry; increases with creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One rendered turn of the conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatEntry {
    pub id: EntryId,
    pub role: Role,
    /// Display markup, already formatted
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("user entries need non-blank content")]
    EmptyUserContent,
}

/// Append-only transcript for a single session
#[derive(Debug)]
pub struct Transcript {
    session_id: Uuid,
    entries: Vec<ChatEntry>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Format `raw` and append it as a new entry.
    ///
    /// User content must be non-blank; assistant content is taken as given.
    pub fn append(&mut self, role: Role, raw: &str) -> Result<ChatEntry, TranscriptError> {
        if role == Role::User && raw.trim().is_empty() {
            return Err(TranscriptError::EmptyUserContent);
        }

        let entry = ChatEntry {
            id: EntryId(self.next_id),
            role,
            content: format_message(raw),
            created_at: Utc::now(),
        };
        self.next_id += 1;
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

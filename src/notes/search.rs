// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Note search queries.
//!
//! A query starting with `tag:` matches one tag exactly; any other query is
//! a substring match over title, content and tags. Both ignore case.

use crate::storage::StoredNote;

/// Prefix selecting an exact tag match.
pub const TAG_PREFIX: &str = "tag:";

/// Parsed search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteQuery {
    /// No filter
    All,
    /// Exact tag match (lowercased)
    Tag(String),
    /// Substring over title, content or any tag (lowercased)
    Text(String),
}

impl NoteQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let query = raw.unwrap_or_default().trim().to_lowercase();
        if query.is_empty() {
            return NoteQuery::All;
        }
        match query.strip_prefix(TAG_PREFIX) {
            Some(tag) => NoteQuery::Tag(tag.trim().to_string()),
            None => NoteQuery::Text(query),
        }
    }

    pub fn matches(&self, note: &StoredNote) -> bool {
        match self {
            NoteQuery::All => true,
            NoteQuery::Tag(tag) => note.tags.iter().any(|t| t.to_lowercase() == *tag),
            NoteQuery::Text(text) => {
                note.title.to_lowercase().contains(text.as_str())
                    || note.content.to_lowercase().contains(text.as_str())
                    || note
                        .tags
                        .iter()
                        .any(|t| t.to_lowercase().contains(text.as_str()))
            }
        }
    }
}

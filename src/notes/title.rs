// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Automatic note titles.
//!
//! When a note is saved without a title, one is derived from the first
//! sentence or line of its content with markup tags removed.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Maximum number of words kept in a derived title.
pub const TITLE_WORD_LIMIT: usize = 5;

/// Title used when the content has no usable text.
pub const UNTITLED_NOTE: &str = "Untitled Note";

static MARKUP_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("valid markup tag regex"));

/// Remove angle-bracket markup tags, keeping the text between them.
pub fn strip_markup(content: &str) -> Cow<'_, str> {
    MARKUP_TAG_RE.replace_all(content, "")
}

/// Derive a short title from note content.
///
/// Uses the first non-empty sentence (split on `.`, `!`, `?` or newline),
/// truncated to [`TITLE_WORD_LIMIT`] words with a trailing `...` when cut.
pub fn derive_title(content: &str) -> String {
    let text = strip_markup(content);
    let Some(sentence) = text
        .split(['.', '!', '?', '\n'])
        .map(str::trim)
        .find(|s| !s.is_empty())
    else {
        return UNTITLED_NOTE.to_string();
    };

    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.len() > TITLE_WORD_LIMIT {
        format!("{}...", words[..TITLE_WORD_LIMIT].join(" "))
    } else {
        words.join(" ")
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`/`Deserialize` and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! ## Note Representation
//!
//! [`NoteResponse`] is the only outward form of a note. It has no password
//! hash field at all, and locked notes are built with
//! [`NoteResponse::redacted`] unless the caller just proved (or set) the
//! password.
//!
//! ## Model Categories
//!
//! - **Auth**: registration, login, current user
//! - **Notes**: create, partial update, unlock, listing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::storage::StoredNote;

/// Color given to notes created without one.
pub const DEFAULT_NOTE_COLOR: &str = "#ffffff";

/// Content shown in place of a locked note's text.
pub const LOCKED_CONTENT_PLACEHOLDER: &str =
    "CONTENT LOCKED • Please unlock to view this note content.";

// =============================================================================
// Auth Models
// =============================================================================

/// Credentials for registration and login.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Generic confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    /// Session token, also set as the session cookie.
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Current user information.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CurrentUserResponse {
    pub user_id: String,
    pub username: String,
}

// =============================================================================
// Note Models
// =============================================================================

/// Request to create a note.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    /// Derived from the content when absent or blank.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    /// Locks the note when non-empty.
    #[serde(default)]
    pub password: Option<String>,
    /// ISO-8601 instant. Unparseable values mean "never expires".
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Sparse update of a note. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub color: Option<String>,
    /// `null` clears the expiry; absent leaves it unchanged.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub expires_at: Option<Option<String>>,
    /// `false` removes the lock and its password.
    #[serde(default)]
    pub is_locked: Option<bool>,
    /// A non-empty value (re)locks the note and wins over `is_locked: false`.
    #[serde(default)]
    pub password: Option<String>,
}

/// Password attempt for a locked note.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UnlockNoteRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Listing query parameters.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct NoteListQuery {
    /// Free text, or `tag:<name>` for an exact tag match.
    pub q: Option<String>,
}

/// Outward note representation. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct NoteResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub color: String,
    pub tags: Vec<String>,
    pub is_locked: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteResponse {
    /// Full representation including content.
    pub fn revealed(note: StoredNote) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            color: note.color,
            tags: note.tags,
            is_locked: note.is_locked,
            expires_at: note.expires_at,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }

    /// Representation with locked content replaced by the placeholder.
    pub fn redacted(note: StoredNote) -> Self {
        let locked = note.is_locked;
        let mut response = Self::revealed(note);
        if locked {
            response.content = LOCKED_CONTENT_PLACEHOLDER.to_string();
        }
        response
    }
}

/// Distinguishes an explicit `null` from an absent field.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

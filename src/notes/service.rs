// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Note lifecycle rules.
//!
//! [`NoteService`] sits between the HTTP handlers and the repository. It
//! owns title derivation, lock handling, expiry, search and redaction, and
//! always works on behalf of one owner.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    error::{NoteError, NoteResult},
    expiry::parse_expiry,
    search::NoteQuery,
    title::derive_title,
};
use crate::auth::{hash_password, verify_password};
use crate::models::{
    CreateNoteRequest, NoteResponse, UpdateNoteRequest, DEFAULT_NOTE_COLOR,
};
use crate::storage::{LockChange, NoteChanges, NoteRepository, StoredNote};

/// Note operations over a repository.
pub struct NoteService<'a, R: NoteRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: NoteRepository + ?Sized> NoteService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Create a note. The creator gets the content back in full.
    pub fn create(&self, owner_user_id: &str, request: CreateNoteRequest) -> NoteResult<NoteResponse> {
        let title = match non_blank(request.title.as_deref()) {
            Some(title) => title.to_string(),
            None => derive_title(&request.content),
        };
        let password_hash = match non_blank_password(request.password.as_deref()) {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };
        let expires_at = request.expires_at.as_deref().and_then(|raw| {
            let parsed = parse_expiry(raw);
            if parsed.is_none() {
                tracing::warn!(expires_at = %raw, "Ignoring unparseable expiry on create");
            }
            parsed
        });

        let now = Utc::now();
        let note = StoredNote {
            id: Uuid::new_v4().to_string(),
            owner_user_id: owner_user_id.to_string(),
            title,
            content: request.content,
            tags: request.tags.unwrap_or_default(),
            color: request
                .color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NOTE_COLOR.to_string()),
            is_locked: password_hash.is_some(),
            password_hash,
            expires_at,
            created_at: now,
            updated_at: now,
        };
        self.repo.create_note(&note)?;

        tracing::info!(
            user_id = %owner_user_id,
            note_id = %note.id,
            is_locked = note.is_locked,
            "Note created"
        );
        Ok(NoteResponse::revealed(note))
    }

    /// List the owner's live notes, newest first, filtered by `query`.
    ///
    /// Expired notes are never returned, even when the cleanup sweep fails.
    pub fn list(&self, owner_user_id: &str, query: Option<&str>) -> NoteResult<Vec<NoteResponse>> {
        let now = Utc::now();
        self.cleanup_expired_at(owner_user_id, now);

        let query = NoteQuery::parse(query);
        let notes = self.repo.list_notes(owner_user_id)?;
        Ok(notes
            .into_iter()
            .filter(|note| !note.is_expired(now))
            .filter(|note| query.matches(note))
            .map(NoteResponse::redacted)
            .collect())
    }

    /// Fetch one note, redacted if locked.
    pub fn get(&self, owner_user_id: &str, note_id: &str) -> NoteResult<NoteResponse> {
        self.find_live(owner_user_id, note_id)
            .map(NoteResponse::redacted)
    }

    /// Apply a partial update.
    pub fn update(
        &self,
        owner_user_id: &str,
        note_id: &str,
        request: UpdateNoteRequest,
    ) -> NoteResult<NoteResponse> {
        let existing = self.find_live(owner_user_id, note_id)?;
        let changes = self.resolve_changes(&existing, request)?;
        if changes.is_empty() {
            return Ok(NoteResponse::redacted(existing));
        }

        let updated = self
            .repo
            .update_note(owner_user_id, note_id, &changes, Utc::now())?
            .ok_or(NoteError::NotFound)?;

        tracing::info!(
            user_id = %owner_user_id,
            note_id = %note_id,
            is_locked = updated.is_locked,
            "Note updated"
        );
        Ok(NoteResponse::redacted(updated))
    }

    /// Check a password against a locked note and reveal it on success.
    /// Never mutates the note.
    pub fn unlock(&self, owner_user_id: &str, note_id: &str, password: &str) -> NoteResult<NoteResponse> {
        let note = self.find_live(owner_user_id, note_id)?;
        if !note.is_locked {
            return Ok(NoteResponse::revealed(note));
        }

        let verified = note
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash));
        if !verified {
            tracing::info!(user_id = %owner_user_id, note_id = %note_id, "Note unlock rejected");
            return Err(NoteError::InvalidPassword);
        }
        Ok(NoteResponse::revealed(note))
    }

    pub fn delete(&self, owner_user_id: &str, note_id: &str) -> NoteResult<()> {
        self.find_live(owner_user_id, note_id)?;
        if !self.repo.delete_note(owner_user_id, note_id)? {
            return Err(NoteError::NotFound);
        }
        tracing::info!(user_id = %owner_user_id, note_id = %note_id, "Note deleted");
        Ok(())
    }

    /// Delete the owner's expired notes. Failures are logged, never returned.
    pub fn cleanup_expired(&self, owner_user_id: &str) -> usize {
        self.cleanup_expired_at(owner_user_id, Utc::now())
    }

    fn cleanup_expired_at(&self, owner_user_id: &str, now: DateTime<Utc>) -> usize {
        match self.repo.delete_expired_notes(owner_user_id, now) {
            Ok(0) => 0,
            Ok(removed) => {
                tracing::debug!(user_id = %owner_user_id, removed, "Expired notes removed");
                removed
            }
            Err(e) => {
                tracing::warn!(user_id = %owner_user_id, error = %e, "Expired note cleanup failed");
                0
            }
        }
    }

    /// Owner-scoped lookup that treats an expired note as gone (and purges it).
    fn find_live(&self, owner_user_id: &str, note_id: &str) -> NoteResult<StoredNote> {
        let note = self
            .repo
            .get_note(owner_user_id, note_id)?
            .ok_or(NoteError::NotFound)?;
        if note.is_expired(Utc::now()) {
            if let Err(e) = self.repo.delete_note(owner_user_id, note_id) {
                tracing::warn!(note_id = %note_id, error = %e, "Failed to purge expired note");
            }
            return Err(NoteError::NotFound);
        }
        Ok(note)
    }

    fn resolve_changes(&self, existing: &StoredNote, request: UpdateNoteRequest) -> NoteResult<NoteChanges> {
        let mut changes = NoteChanges::default();

        match non_blank(request.title.as_deref()) {
            Some(title) => changes.title = Some(title.to_string()),
            None => {
                if let Some(content) = &request.content {
                    changes.title = Some(derive_title(content));
                }
            }
        }
        changes.content = request.content;
        changes.tags = request.tags;
        changes.color = request.color.filter(|c| !c.trim().is_empty());

        if let Some(expires_at) = request.expires_at {
            match expires_at {
                None => changes.expires_at = Some(None),
                Some(raw) => match parse_expiry(&raw) {
                    Some(parsed) => changes.expires_at = Some(Some(parsed)),
                    None => {
                        tracing::warn!(note_id = %existing.id, expires_at = %raw, "Ignoring unparseable expiry on update");
                    }
                },
            }
        }

        if let Some(password) = non_blank_password(request.password.as_deref()) {
            changes.lock = Some(LockChange::Lock {
                password_hash: hash_password(password)?,
            });
        } else if request.is_locked == Some(false) && existing.is_locked {
            changes.lock = Some(LockChange::Unlock);
        }

        Ok(changes)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn non_blank_password(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

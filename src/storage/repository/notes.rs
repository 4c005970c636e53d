// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Note repository backed by the redb notes database.
//!
//! Notes live in the `notes` table keyed by id. The `owner_notes` index is
//! the only way notes are enumerated, so every scan is owner-scoped.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use super::super::database::{
    note_id_from_key, owner_key, owner_prefix, owner_prefix_end, NOTES, OWNER_NOTES,
};
use super::super::{NotesDatabase, OwnedResource, OwnershipCheck, StoreError, StoreResult};

/// Note record as persisted. Carries the lock password hash, so it is never
/// serialized to API clients directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredNote {
    /// Unique note identifier (UUID)
    pub id: String,
    /// Owning user ID, immutable after creation
    pub owner_user_id: String,
    /// Never empty
    pub title: String,
    pub content: String,
    /// Caller-ordered tag list
    pub tags: Vec<String>,
    pub color: String,
    pub is_locked: bool,
    /// Present if and only if `is_locked`
    pub password_hash: Option<String>,
    /// Absent means the note never expires
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredNote {
    /// Whether the note has reached its expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Apply a set of field changes and bump `updated_at`.
    pub fn apply(&mut self, changes: &NoteChanges, updated_at: DateTime<Utc>) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(content) = &changes.content {
            self.content = content.clone();
        }
        if let Some(tags) = &changes.tags {
            self.tags = tags.clone();
        }
        if let Some(color) = &changes.color {
            self.color = color.clone();
        }
        if let Some(expires_at) = changes.expires_at {
            self.expires_at = expires_at;
        }
        match &changes.lock {
            Some(LockChange::Lock { password_hash }) => {
                self.is_locked = true;
                self.password_hash = Some(password_hash.clone());
            }
            Some(LockChange::Unlock) => {
                self.is_locked = false;
                self.password_hash = None;
            }
            None => {}
        }
        self.updated_at = updated_at;
    }
}

impl OwnedResource for StoredNote {
    fn owner_user_id(&self) -> &str {
        &self.owner_user_id
    }
}

/// Change to the lock state. Flag and hash always move together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockChange {
    Lock { password_hash: String },
    Unlock,
}

/// Resolved field changes for a partial note update. `None` leaves the
/// field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub color: Option<String>,
    /// `Some(None)` clears the expiry.
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub lock: Option<LockChange>,
}

impl NoteChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self == &NoteChanges::default()
    }
}

/// Persistence operations for notes. Every lookup and mutation is scoped
/// to the owning user.
pub trait NoteRepository {
    /// Insert a new note.
    fn create_note(&self, note: &StoredNote) -> StoreResult<()>;

    /// Get a note by id, only if `owner_user_id` owns it.
    fn get_note(&self, owner_user_id: &str, note_id: &str) -> StoreResult<Option<StoredNote>>;

    /// All notes of an owner, most recently updated first.
    fn list_notes(&self, owner_user_id: &str) -> StoreResult<Vec<StoredNote>>;

    /// Apply `changes` atomically. Returns `None` if the note is missing or
    /// owned by someone else.
    fn update_note(
        &self,
        owner_user_id: &str,
        note_id: &str,
        changes: &NoteChanges,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<StoredNote>>;

    /// Delete a note. Returns `false` if nothing owned by the caller matched.
    fn delete_note(&self, owner_user_id: &str, note_id: &str) -> StoreResult<bool>;

    /// Delete every note of an owner whose expiry is at or before `now`.
    fn delete_expired_notes(&self, owner_user_id: &str, now: DateTime<Utc>) -> StoreResult<usize>;
}

impl NoteRepository for NotesDatabase {
    fn create_note(&self, note: &StoredNote) -> StoreResult<()> {
        let json = serde_json::to_vec(note)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut notes = write_txn.open_table(NOTES)?;
            if notes.get(note.id.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("Note {}", note.id)));
            }
            notes.insert(note.id.as_str(), json.as_slice())?;

            let mut index = write_txn.open_table(OWNER_NOTES)?;
            let key = owner_key(&note.owner_user_id, &note.id);
            index.insert(key.as_str(), ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_note(&self, owner_user_id: &str, note_id: &str) -> StoreResult<Option<StoredNote>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NOTES)?;
        let note = match table.get(note_id)? {
            Some(value) => Some(serde_json::from_slice::<StoredNote>(value.value())?),
            None => None,
        };
        Ok(note.owned_by(owner_user_id))
    }

    fn list_notes(&self, owner_user_id: &str) -> StoreResult<Vec<StoredNote>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(OWNER_NOTES)?;
        let notes = read_txn.open_table(NOTES)?;

        let start = owner_prefix(owner_user_id);
        let end = owner_prefix_end(owner_user_id);

        let mut results = Vec::new();
        for entry in index.range(start.as_str()..end.as_str())? {
            let (key, _) = entry?;
            let Some(note_id) = note_id_from_key(key.value()).map(str::to_string) else {
                continue;
            };
            match notes.get(note_id.as_str())? {
                Some(value) => {
                    let note: StoredNote = serde_json::from_slice(value.value())?;
                    if note.is_owned_by(owner_user_id) {
                        results.push(note);
                    }
                }
                None => {
                    tracing::warn!(note_id = %note_id, "Owner index points at a missing note");
                }
            }
        }

        results.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(results)
    }

    fn update_note(
        &self,
        owner_user_id: &str,
        note_id: &str,
        changes: &NoteChanges,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<StoredNote>> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(NOTES)?;

            // Read existing value and deserialize before mutating
            let existing = match table.get(note_id)? {
                Some(value) => Some(serde_json::from_slice::<StoredNote>(value.value())?),
                None => None,
            };
            let Some(mut note) = existing.owned_by(owner_user_id) else {
                return Ok(None);
            };

            note.apply(changes, updated_at);
            let json = serde_json::to_vec(&note)?;
            table.insert(note_id, json.as_slice())?;
            note
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    fn delete_note(&self, owner_user_id: &str, note_id: &str) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        {
            let mut notes = write_txn.open_table(NOTES)?;
            let existing = match notes.get(note_id)? {
                Some(value) => Some(serde_json::from_slice::<StoredNote>(value.value())?),
                None => None,
            };
            if existing.owned_by(owner_user_id).is_none() {
                return Ok(false);
            }
            notes.remove(note_id)?;

            let mut index = write_txn.open_table(OWNER_NOTES)?;
            let key = owner_key(owner_user_id, note_id);
            index.remove(key.as_str())?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    fn delete_expired_notes(&self, owner_user_id: &str, now: DateTime<Utc>) -> StoreResult<usize> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut index = write_txn.open_table(OWNER_NOTES)?;
            let mut notes = write_txn.open_table(NOTES)?;

            let start = owner_prefix(owner_user_id);
            let end = owner_prefix_end(owner_user_id);

            let mut keys = Vec::new();
            for entry in index.range(start.as_str()..end.as_str())? {
                let (key, _) = entry?;
                keys.push(key.value().to_string());
            }

            let mut expired_keys = Vec::new();
            for key in keys {
                let Some(note_id) = note_id_from_key(&key) else {
                    continue;
                };
                let expired = match notes.get(note_id)? {
                    Some(value) => serde_json::from_slice::<StoredNote>(value.value())?
                        .is_expired(now),
                    // Dangling index entry, drop it as well
                    None => true,
                };
                if expired {
                    expired_keys.push(key);
                }
            }

            for key in &expired_keys {
                if let Some(note_id) = note_id_from_key(key) {
                    notes.remove(note_id)?;
                }
                index.remove(key.as_str())?;
            }
            expired_keys.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }
}

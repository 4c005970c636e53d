// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded notes database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized StoredUser
//! - `usernames`: username → user_id (uniqueness index)
//! - `notes`: note_id → serialized StoredNote
//! - `owner_notes`: composite key (owner_id|note_id) → ()
//! - `sessions`: session_id → serialized StoredSession

use std::path::Path;

use redb::{Database, ReadableDatabase, TableDefinition};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary user table: user_id → serialized StoredUser (JSON bytes).
pub(super) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Unique index: username → user_id.
pub(super) const USERNAMES: TableDefinition<&str, &str> = TableDefinition::new("usernames");

/// Primary note table: note_id → serialized StoredNote (JSON bytes).
pub(super) const NOTES: TableDefinition<&str, &[u8]> = TableDefinition::new("notes");

/// Owner index. Key format: `owner_id|note_id`.
pub(super) const OWNER_NOTES: TableDefinition<&str, ()> = TableDefinition::new("owner_notes");

/// Login sessions: session_id → serialized StoredSession (JSON bytes).
pub(super) const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "notes.redb";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the owner_notes table.
pub(super) fn owner_key(owner_id: &str, note_id: &str) -> String {
    format!("{owner_id}|{note_id}")
}

/// Inclusive start of the range holding every note of an owner.
pub(super) fn owner_prefix(owner_id: &str) -> String {
    format!("{owner_id}|")
}

/// Exclusive end of an owner's range. `}` sorts immediately after `|`.
pub(super) fn owner_prefix_end(owner_id: &str) -> String {
    format!("{owner_id}}}")
}

/// Extract the note_id portion from an owner index key.
pub(super) fn note_id_from_key(key: &str) -> Option<&str> {
    key.split_once('|').map(|(_, note_id)| note_id)
}

// =============================================================================
// NotesDatabase
// =============================================================================

/// Embedded ACID database holding users, notes and sessions.
pub struct NotesDatabase {
    pub(super) db: Database,
}

impl NotesDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAMES)?;
            let _ = write_txn.open_table(NOTES)?;
            let _ = write_txn.open_table(OWNER_NOTES)?;
            let _ = write_txn.open_table(SESSIONS)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Notes database opened");
        Ok(Self { db })
    }

    /// Open the database file inside a data directory.
    pub fn open_in_dir(data_dir: &Path) -> StoreResult<Self> {
        Self::open(&data_dir.join(DATABASE_FILE))
    }

    /// Verify that a read transaction can be opened against every table.
    pub fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        let _ = read_txn.open_table(USERNAMES)?;
        let _ = read_txn.open_table(NOTES)?;
        let _ = read_txn.open_table(OWNER_NOTES)?;
        let _ = read_txn.open_table(SESSIONS)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

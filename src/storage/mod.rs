// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for users, notes and login sessions in a single
//! embedded redb database under `DATA_DIR`.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   notes.redb
//!     users        user_id  -> StoredUser (JSON)
//!     usernames    username -> user_id
//!     notes        note_id  -> StoredNote (JSON)
//!     owner_notes  owner_id|note_id -> ()
//!     sessions     session_id -> StoredSession (JSON)
//! ```
//!
//! ## Important Notes
//!
//! - Notes are only reachable through owner-scoped repository calls
//! - Multi-record changes happen inside one write transaction

pub mod database;
pub mod ownership;
pub mod repository;

pub use database::{NotesDatabase, StoreError, StoreResult};
pub use ownership::{OwnedResource, OwnershipCheck};
pub use repository::{
    LockChange, NoteChanges, NoteRepository, SessionRepository, StoredNote, StoredSession,
    StoredUser, UserRepository,
};

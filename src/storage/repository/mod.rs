// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed, owner-scoped access to the database.
//!
//! Each repository is a trait implemented by [`NotesDatabase`](super::NotesDatabase),
//! so services depend on the operations rather than on redb.

pub mod notes;
pub mod sessions;
pub mod users;

pub use notes::{LockChange, NoteChanges, NoteRepository, StoredNote};
pub use sessions::{SessionRepository, StoredSession};
pub use users::{StoredUser, UserRepository};

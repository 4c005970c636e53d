// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Note service errors.

use crate::auth::PasswordError;
use crate::storage::StoreError;

/// Failure of a note operation.
///
/// `NotFound` covers both a missing note and one owned by another user.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("Note not found")]
    NotFound,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Hashing(#[from] PasswordError),
}

pub type NoteResult<T> = Result<T, NoteError>;

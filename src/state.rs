// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::SessionManager;
use crate::storage::NotesDatabase;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<NotesDatabase>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(db: NotesDatabase, sessions: SessionManager) -> Self {
        Self {
            db: Arc::new(db),
            sessions: Arc::new(sessions),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by a temporary database. Keep the returned directory
    /// alive for as long as the state is used.
    pub(crate) fn for_tests() -> (Self, tempfile::TempDir) {
        let (db, dir) = crate::storage::database::tests::temp_db();
        let sessions = SessionManager::new(
            b"test-session-secret-0123456789abcdef",
            chrono::Duration::hours(1),
        );
        (Self::new(db, sessions), dir)
    }
}

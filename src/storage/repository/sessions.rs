// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login session repository.
//!
//! A signed session token is only honoured while its session record exists,
//! which is what makes logout effective. Expired records are pruned on
//! login.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use super::super::database::SESSIONS;
use super::super::{NotesDatabase, StoreResult};

/// Server-side record of a login session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSession {
    /// Session identifier, embedded in the token as `sid`
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Persistence operations for login sessions.
pub trait SessionRepository {
    fn create_session(&self, session: &StoredSession) -> StoreResult<()>;

    fn get_session(&self, session_id: &str) -> StoreResult<Option<StoredSession>>;

    /// Returns `false` if the session did not exist.
    fn delete_session(&self, session_id: &str) -> StoreResult<bool>;

    /// Delete every session whose expiry is at or before `now`.
    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<usize>;
}

impl SessionRepository for NotesDatabase {
    fn create_session(&self, session: &StoredSession) -> StoreResult<()> {
        let json = serde_json::to_vec(session)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            table.insert(session.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_session(&self, session_id: &str) -> StoreResult<Option<StoredSession>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;
        match table.get(session_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn delete_session(&self, session_id: &str) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let removed = table.remove(session_id)?;
            removed.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }

    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(SESSIONS)?;

            let mut expired = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let session: StoredSession = serde_json::from_slice(value.value())?;
                if session.is_expired(now) {
                    expired.push(key.value().to_string());
                }
            }

            for session_id in &expired {
                table.remove(session_id.as_str())?;
            }
            expired.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }
}

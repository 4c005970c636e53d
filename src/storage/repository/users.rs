// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User account repository.
//!
//! Usernames are unique; the `usernames` table is the uniqueness index and
//! is written in the same transaction as the account itself.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use super::super::database::{USERNAMES, USERS};
use super::super::{NotesDatabase, StoreError, StoreResult};

/// User account as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub id: String,
    /// Unique login name
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence operations for user accounts.
pub trait UserRepository {
    /// Insert a new user. Fails with `AlreadyExists` if the username is taken.
    fn create_user(&self, user: &StoredUser) -> StoreResult<()>;

    /// Look up a user by id.
    fn get_user(&self, user_id: &str) -> StoreResult<Option<StoredUser>>;

    /// Look up a user by exact username.
    fn find_user_by_username(&self, username: &str) -> StoreResult<Option<StoredUser>>;
}

impl UserRepository for NotesDatabase {
    fn create_user(&self, user: &StoredUser) -> StoreResult<()> {
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut usernames = write_txn.open_table(USERNAMES)?;
            if usernames.get(user.username.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!(
                    "Username {}",
                    user.username
                )));
            }
            usernames.insert(user.username.as_str(), user.id.as_str())?;

            let mut users = write_txn.open_table(USERS)?;
            users.insert(user.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_user(&self, user_id: &str) -> StoreResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(user_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn find_user_by_username(&self, username: &str) -> StoreResult<Option<StoredUser>> {
        let user_id = {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(USERNAMES)?;
            match table.get(username)? {
                Some(v) => v.value().to_string(),
                None => return Ok(None),
            }
        };
        self.get_user(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::tests::temp_db;

    fn test_user(id: &str, username: &str) -> StoredUser {
        StoredUser {
            id: id.to_string(),
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_lookup_user() {
        let (db, _dir) = temp_db();
        let user = test_user("u-1", "alice");
        db.create_user(&user).unwrap();

        assert_eq!(db.get_user("u-1").unwrap(), Some(user.clone()));
        assert_eq!(db.find_user_by_username("alice").unwrap(), Some(user));
        assert!(db.find_user_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_rejected() {
        let (db, _dir) = temp_db();
        db.create_user(&test_user("u-1", "alice")).unwrap();

        let result = db.create_user(&test_user("u-2", "alice"));
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
        assert!(db.get_user("u-2").unwrap().is_none());
    }
}

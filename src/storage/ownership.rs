// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for note storage.
//!
//! Every note lookup passes through these checks inside the repository, so
//! a note owned by someone else is indistinguishable from a missing one.

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_user_id(&self) -> &str;

    /// Whether `user_id` owns this resource.
    fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_user_id() == user_id
    }
}

/// Extension trait that drops resources the caller does not own.
pub trait OwnershipCheck<T> {
    /// Keep the resource only if `user_id` owns it.
    fn owned_by(self, user_id: &str) -> Option<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn owned_by(self, user_id: &str) -> Option<T> {
        self.filter(|resource| resource.is_owned_by(user_id))
    }
}

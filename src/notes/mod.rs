// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Note Service
//!
//! Business rules for the note lifecycle:
//!
//! - [`title`]: title derivation from content
//! - [`expiry`]: expiry instant parsing
//! - [`search`]: `tag:` and free-text queries
//! - [`service`]: create, list, get, update, unlock, delete, expiry cleanup
//!
//! Every operation runs on behalf of exactly one owner and returns
//! [`NoteResponse`](crate::models::NoteResponse) values that have already
//! been redacted where required.

pub mod error;
pub mod expiry;
pub mod search;
pub mod service;
pub mod title;

pub use error::{NoteError, NoteResult};
pub use search::NoteQuery;
pub use service::NoteService;

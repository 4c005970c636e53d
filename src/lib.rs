// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Aura Notes - Personal Note-Taking Service
//!
//! Authenticated users create, list, search, update and delete short text
//! notes. Notes can be locked behind their own password and can expire.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum) and OpenAPI document
//! - `auth` - Accounts, session tokens and password hashing
//! - `notes` - Note lifecycle rules (titles, locking, expiry, search)
//! - `storage` - Embedded redb database and repositories

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod notes;
pub mod state;
pub mod storage;

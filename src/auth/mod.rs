// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Username/password accounts with server-side sessions.
//!
//! ## Auth Flow
//!
//! 1. Client registers or logs in with `{username, password}`
//! 2. Server verifies the Argon2 hash, stores a session record and returns
//!    a signed token, both in the body and as the `aura_session` cookie
//! 3. Later requests send the cookie or `Authorization: Bearer <token>`
//! 4. Server verifies the token signature and expiry, then checks that the
//!    session record still exists
//!    - `sub` → canonical `user_id`
//!
//! ## Security
//!
//! - All note endpoints require authentication
//! - Logout deletes the session record, invalidating the token at once
//! - Password comparison is constant-time (Argon2 verifier)
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod session;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use middleware::require_session;
pub use password::{hash_password, verify_password, PasswordError};
pub use session::{IssuedSession, SessionManager, SESSION_COOKIE};

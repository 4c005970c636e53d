// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and authenticated user representation.

use serde::{Deserialize, Serialize};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Server-side session ID
    pub sid: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Authenticated caller resolved from a session token.
///
/// This is the identity every note operation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Canonical user ID (token `sub` claim)
    pub user_id: String,
    /// Session the request belongs to
    pub session_id: String,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            session_id: claims.sid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_claims_maps_fields() {
        let user = AuthenticatedUser::from_claims(SessionClaims {
            sub: "user_123".to_string(),
            sid: "sess_abc".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        });
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.session_id, "sess_abc");
    }
}

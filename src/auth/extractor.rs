// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use chrono::Utc;

use super::{session::session_token, AuthError, AuthenticatedUser};
use crate::state::AppState;
use crate::storage::SessionRepository;

/// Extractor for authenticated users.
///
/// Reuses the user resolved by [`require_session`](super::middleware::require_session)
/// when that middleware already ran, otherwise authenticates the request
/// itself.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_notes(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<NoteResponse>>, ApiError> {
///     // user.user_id scopes every note operation
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }
        authenticate(&parts.headers, state).map(Auth)
    }
}

/// Resolve the caller from request headers.
///
/// The token must verify and its session record must still exist and
/// belong to the token subject.
pub fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<AuthenticatedUser, AuthError> {
    let token = session_token(headers)?.ok_or(AuthError::MissingSession)?;
    let claims = state.sessions.verify(token)?;

    let session = state
        .db
        .get_session(&claims.sid)
        .map_err(|e| AuthError::InternalError(e.to_string()))?
        .ok_or(AuthError::SessionRevoked)?;

    if session.user_id != claims.sub {
        tracing::warn!(session_id = %claims.sid, "Session subject mismatch");
        return Err(AuthError::SessionRevoked);
    }
    if session.is_expired(Utc::now()) {
        if let Err(e) = state.db.delete_session(&session.id) {
            tracing::warn!(session_id = %session.id, error = %e, "Failed to remove expired session");
        }
        return Err(AuthError::TokenExpired);
    }

    Ok(AuthenticatedUser::from_claims(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, header::COOKIE, Request};

    fn parts_with(header: Option<(axum::http::HeaderName, String)>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn logged_in(state: &AppState, user_id: &str) -> String {
        let issued = state.sessions.issue(user_id, Utc::now()).unwrap();
        state.db.create_session(&issued.record).unwrap();
        issued.token
    }

    #[tokio::test]
    async fn missing_credentials_rejected() {
        let (state, _dir) = AppState::for_tests();
        let mut parts = parts_with(None);
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingSession)));
    }

    #[tokio::test]
    async fn bearer_token_authenticates() {
        let (state, _dir) = AppState::for_tests();
        let token = logged_in(&state, "user-1");
        let mut parts = parts_with(Some((AUTHORIZATION, format!("Bearer {token}"))));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, "user-1");
    }

    #[tokio::test]
    async fn cookie_authenticates() {
        let (state, _dir) = AppState::for_tests();
        let token = logged_in(&state, "user-2");
        let mut parts = parts_with(Some((COOKIE, format!("aura_session={token}"))));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, "user-2");
    }

    #[tokio::test]
    async fn deleted_session_rejected() {
        let (state, _dir) = AppState::for_tests();
        let token = logged_in(&state, "user-1");
        let claims = state.sessions.verify(&token).unwrap();
        state.db.delete_session(&claims.sid).unwrap();

        let mut parts = parts_with(Some((AUTHORIZATION, format!("Bearer {token}"))));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::SessionRevoked)));
    }

    #[tokio::test]
    async fn expired_session_record_is_removed() {
        let (state, _dir) = AppState::for_tests();
        let token = logged_in(&state, "user-1");
        let claims = state.sessions.verify(&token).unwrap();

        // Token still verifies, but the server-side record has lapsed.
        let mut record = state.db.get_session(&claims.sid).unwrap().unwrap();
        record.expires_at = Utc::now() - chrono::Duration::minutes(1);
        state.db.create_session(&record).unwrap();

        let mut parts = parts_with(Some((AUTHORIZATION, format!("Bearer {token}"))));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
        assert!(state.db.get_session(&claims.sid).unwrap().is_none());
    }

    #[tokio::test]
    async fn extension_user_is_reused() {
        let (state, _dir) = AppState::for_tests();
        let mut parts = parts_with(None);
        parts.extensions.insert(AuthenticatedUser {
            user_id: "from-middleware".to_string(),
            session_id: "s".to_string(),
        });

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, "from-middleware");
    }
}

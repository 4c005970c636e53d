// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration and session endpoints.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{
    auth::{hash_password, session::session_token, verify_password, Auth, AuthError},
    error::ApiError,
    models::{CredentialsRequest, CurrentUserResponse, LoginResponse, MessageResponse},
    notes::NoteService,
    state::AppState,
    storage::{SessionRepository, StoreError, StoredUser, UserRepository},
};

/// Trimmed, NFC-normalized username.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().nfc().collect()
}

/// Extract a non-blank username and password.
fn credentials(request: CredentialsRequest) -> Option<(String, String)> {
    let username = normalize_username(request.username.as_deref().unwrap_or_default());
    let password = request.password.unwrap_or_default();
    if username.is_empty() || password.trim().is_empty() {
        return None;
    }
    Some((username, password))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CredentialsRequest,
    tag = "Auth",
    responses(
        (status = 201, body = MessageResponse),
        (status = 400, description = "Username or password missing"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let (username, password) = credentials(request)
        .ok_or_else(|| ApiError::bad_request("Username and password required"))?;

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing task failed");
            ApiError::internal()
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to hash account password");
            ApiError::internal()
        })?;
    let user = StoredUser {
        id: Uuid::new_v4().to_string(),
        username,
        password_hash,
        created_at: Utc::now(),
    };

    match state.db.create_user(&user) {
        Ok(()) => {}
        Err(StoreError::AlreadyExists(_)) => {
            return Err(ApiError::conflict("Username already exists"));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store user");
            return Err(ApiError::internal());
        }
    }

    tracing::info!(user_id = %user.id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialsRequest,
    tag = "Auth",
    responses(
        (status = 200, body = LoginResponse, description = "Session cookie is set"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<([(axum::http::HeaderName, String); 1], Json<LoginResponse>), AuthError> {
    let (username, password) = credentials(request).ok_or(AuthError::InvalidCredentials)?;

    let user = state
        .db
        .find_user_by_username(&username)
        .map_err(|e| AuthError::InternalError(e.to_string()))?;

    let verified = match &user {
        Some(user) => {
            let hash = user.password_hash.clone();
            tokio::task::spawn_blocking(move || verify_password(&password, &hash))
                .await
                .map_err(|e| AuthError::InternalError(e.to_string()))?
        }
        None => false,
    };
    let user = user.filter(|_| verified).ok_or_else(|| {
        tracing::info!("Login rejected");
        AuthError::InvalidCredentials
    })?;

    let now = Utc::now();
    let issued = state.sessions.issue(&user.id, now)?;
    state
        .db
        .create_session(&issued.record)
        .map_err(|e| AuthError::InternalError(e.to_string()))?;

    match state.db.delete_expired_sessions(now) {
        Ok(0) => {}
        Ok(removed) => tracing::debug!(removed, "Expired sessions removed"),
        Err(e) => tracing::warn!(error = %e, "Expired session cleanup failed"),
    }
    NoteService::new(state.db.as_ref()).cleanup_expired(&user.id);

    tracing::info!(user_id = %user.id, session_id = %issued.record.id, "User logged in");
    let cookie = state.sessions.session_cookie(&issued.token);
    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful".to_string(),
            token: issued.token,
            expires_at: issued.record.expires_at,
        }),
    ))
}

/// Revoke the caller's session if there is one. Always succeeds.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, body = MessageResponse))
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ([(axum::http::HeaderName, String); 1], Json<MessageResponse>) {
    let claims = session_token(&headers)
        .ok()
        .flatten()
        .and_then(|token| state.sessions.verify(token).ok());

    if let Some(claims) = claims {
        match state.db.delete_session(&claims.sid) {
            Ok(true) => tracing::info!(user_id = %claims.sub, session_id = %claims.sid, "User logged out"),
            Ok(false) => {}
            Err(e) => tracing::warn!(session_id = %claims.sid, error = %e, "Failed to revoke session"),
        }
    }

    (
        [(SET_COOKIE, state.sessions.clearing_cookie())],
        Json(MessageResponse::new("Logged out successfully")),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, body = CurrentUserResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn me(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<CurrentUserResponse>, AuthError> {
    let stored = state
        .db
        .get_user(&user.user_id)
        .map_err(|e| AuthError::InternalError(e.to_string()))?
        .ok_or(AuthError::SessionRevoked)?;
    Ok(Json(CurrentUserResponse {
        user_id: stored.id,
        username: stored.username,
    }))
}

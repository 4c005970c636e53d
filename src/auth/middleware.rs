// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied to the notes router subtree so that every note route rejects
//! anonymous callers before the handler runs. The resolved user is stored
//! in request extensions, where the [`Auth`](super::Auth) extractor picks
//! it up.
//!
//! ```rust,ignore
//! let notes = Router::new()
//!     .route("/", get(list_notes))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), require_session));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::authenticate;
use crate::state::AppState;

/// Reject requests without a valid session.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &state) {
        Ok(user) => {
            let span = tracing::Span::current();
            span.record("user_id", user.user_id.as_str());
            span.record("session_id", user.session_id.as_str());
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(
                path = %request.uri().path(),
                error_code = e.error_code(),
                "Rejected unauthenticated request"
            );
            e.into_response()
        }
    }
}

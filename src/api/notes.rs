// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Note endpoints. Every handler is scoped to the authenticated caller.
//!
//! Note operations hash passwords and do synchronous database I/O, so they
//! run on the blocking thread pool.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        CreateNoteRequest, MessageResponse, NoteListQuery, NoteResponse, UnlockNoteRequest,
        UpdateNoteRequest,
    },
    notes::{NoteResult, NoteService},
    state::AppState,
    storage::NotesDatabase,
};

/// Run a note operation on the blocking pool.
async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(NoteService<'_, NotesDatabase>) -> NoteResult<T> + Send + 'static,
    T: Send + 'static,
{
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || op(NoteService::new(db.as_ref())))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Note task failed");
            ApiError::internal()
        })?
        .map_err(ApiError::from)
}

#[utoipa::path(
    get,
    path = "/api/notes",
    params(NoteListQuery),
    tag = "Notes",
    responses(
        (status = 200, body = [NoteResponse], description = "Caller's notes, newest first, locked content redacted"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_notes(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(params): Query<NoteListQuery>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let notes = run_blocking(&state, move |notes| {
        notes.list(&user.user_id, params.q.as_deref())
    })
    .await?;
    Ok(Json(notes))
}

#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = CreateNoteRequest,
    tag = "Notes",
    responses(
        (status = 201, body = NoteResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn create_note(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
    let note = run_blocking(&state, move |notes| notes.create(&user.user_id, request)).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

#[utoipa::path(
    get,
    path = "/api/notes/{note_id}",
    params(
        ("note_id" = String, Path, description = "Note identifier")
    ),
    tag = "Notes",
    responses(
        (status = 200, body = NoteResponse),
        (status = 404, description = "Note not found")
    )
)]
pub async fn get_note(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(note_id): Path<String>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = run_blocking(&state, move |notes| notes.get(&user.user_id, &note_id)).await?;
    Ok(Json(note))
}

#[utoipa::path(
    put,
    path = "/api/notes/{note_id}",
    params(
        ("note_id" = String, Path, description = "Note identifier")
    ),
    request_body = UpdateNoteRequest,
    tag = "Notes",
    responses(
        (status = 200, body = NoteResponse),
        (status = 404, description = "Note not found")
    )
)]
pub async fn update_note(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    Json(request): Json<UpdateNoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = run_blocking(&state, move |notes| {
        notes.update(&user.user_id, &note_id, request)
    })
    .await?;
    Ok(Json(note))
}

#[utoipa::path(
    delete,
    path = "/api/notes/{note_id}",
    params(
        ("note_id" = String, Path, description = "Note identifier")
    ),
    tag = "Notes",
    responses(
        (status = 200, body = MessageResponse),
        (status = 404, description = "Note not found")
    )
)]
pub async fn delete_note(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(note_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    run_blocking(&state, move |notes| notes.delete(&user.user_id, &note_id)).await?;
    Ok(Json(MessageResponse::new("Note deleted")))
}

#[utoipa::path(
    post,
    path = "/api/notes/{note_id}/unlock",
    params(
        ("note_id" = String, Path, description = "Note identifier")
    ),
    request_body = UnlockNoteRequest,
    tag = "Notes",
    responses(
        (status = 200, body = NoteResponse, description = "Note with content revealed"),
        (status = 401, description = "Invalid password"),
        (status = 404, description = "Note not found")
    )
)]
pub async fn unlock_note(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    Json(request): Json<UnlockNoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    let password = request.password.unwrap_or_default();
    let note = run_blocking(&state, move |notes| {
        notes.unlock(&user.user_id, &note_id, &password)
    })
    .await?;
    Ok(Json(note))
}

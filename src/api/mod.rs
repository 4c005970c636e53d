// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_session,
    models::{
        CreateNoteRequest, CredentialsRequest, CurrentUserResponse, LoginResponse,
        MessageResponse, NoteResponse, UnlockNoteRequest, UpdateNoteRequest,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod notes;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState, cors_permissive: bool) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/signup", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    let note_routes = Router::new()
        .route("/", get(notes::list_notes).post(notes::create_note))
        .route(
            "/{note_id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/{note_id}/unlock", post(notes::unlock_note))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    let api_routes = Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/notes", note_routes)
        .merge(health_routes)
        .with_state(state);

    let cors = if cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id,
                user_id = tracing::field::Empty,
                session_id = tracing::field::Empty,
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        notes::list_notes,
        notes::create_note,
        notes::get_note,
        notes::update_note,
        notes::delete_note,
        notes::unlock_note,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            CredentialsRequest,
            MessageResponse,
            LoginResponse,
            CurrentUserResponse,
            CreateNoteRequest,
            UpdateNoteRequest,
            UnlockNoteRequest,
            NoteResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Accounts and sessions"),
        (name = "Notes", description = "Note management, locking and search"),
        (name = "Health", description = "Liveness and readiness checks")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, HeaderMap, Method, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::models::LOCKED_CONTENT_PLACEHOLDER;

    struct TestApp {
        app: Router,
        _dir: tempfile::TempDir,
    }

    impl TestApp {
        fn new() -> Self {
            let (state, dir) = AppState::for_tests();
            Self {
                app: router(state, true),
                _dir: dir,
            }
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, HeaderMap, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, headers, value)
        }

        /// Register and log in, returning the session token.
        async fn login_as(&self, username: &str) -> String {
            let creds = json!({"username": username, "password": "correct horse"});
            let (status, _, _) = self
                .send(Method::POST, "/api/auth/register", None, Some(creds.clone()))
                .await;
            assert_eq!(status, StatusCode::CREATED);

            let (status, _, body) = self
                .send(Method::POST, "/api/auth/login", None, Some(creds))
                .await;
            assert_eq!(status, StatusCode::OK);
            body["token"].as_str().unwrap().to_string()
        }
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state, false);
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn notes_require_session() {
        let app = TestApp::new();
        let (status, _, body) = app.send(Method::GET, "/api/notes", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "missing_session");

        let (status, _, _) = app
            .send(Method::POST, "/api/notes/abc/unlock", Some("garbage"), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = TestApp::new();
        let (status, headers, _) = app.send(Method::GET, "/health/live", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers.contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn signup_alias_registers() {
        let app = TestApp::new();
        let creds = json!({"username": "carol", "password": "pw"});
        let (status, _, body) = app
            .send(Method::POST, "/api/auth/signup", None, Some(creds.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User created successfully");

        let (status, _, body) = app
            .send(Method::POST, "/api/auth/register", None, Some(creds))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username already exists");
    }

    #[tokio::test]
    async fn login_sets_cookie_and_cookie_authenticates() {
        let app = TestApp::new();
        app.login_as("dave").await;

        let creds = json!({"username": "dave", "password": "correct horse"});
        let (_, headers, _) = app
            .send(Method::POST, "/api/auth/login", None, Some(creds))
            .await;
        let set_cookie = headers
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let pair = set_cookie.split(';').next().unwrap().to_string();
        assert!(pair.starts_with("aura_session="));

        let request = Request::builder()
            .uri("/api/auth/me")
            .header(header::COOKIE, pair)
            .body(Body::empty())
            .unwrap();
        let response = app.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["username"], "dave");
    }

    #[tokio::test]
    async fn bad_credentials_are_401() {
        let app = TestApp::new();
        app.login_as("erin").await;
        let (status, _, body) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"username": "erin", "password": "wrong"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn logout_invalidates_token() {
        let app = TestApp::new();
        let token = app.login_as("frank").await;

        let (status, _, _) = app.send(Method::GET, "/api/notes", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, headers, _) = app
            .send(Method::POST, "/api/auth/logout", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));

        let (status, _, body) = app.send(Method::GET, "/api/notes", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "session_revoked");
    }

    #[tokio::test]
    async fn locked_note_lifecycle() {
        let app = TestApp::new();
        let token = app.login_as("grace").await;

        let (status, _, created) = app
            .send(
                Method::POST,
                "/api/notes",
                Some(&token),
                Some(json!({"content": "the vault code is 1234", "password": "pw"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["content"], "the vault code is 1234");
        assert_eq!(created["is_locked"], true);
        assert!(created.get("password").is_none());
        let id = created["id"].as_str().unwrap().to_string();

        let (_, _, listed) = app.send(Method::GET, "/api/notes", Some(&token), None).await;
        assert_eq!(listed[0]["content"], LOCKED_CONTENT_PLACEHOLDER);
        assert!(listed[0].get("password_hash").is_none());

        let unlock_uri = format!("/api/notes/{id}/unlock");
        let (status, _, body) = app
            .send(Method::POST, &unlock_uri, Some(&token), Some(json!({"password": "nope"})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid password");

        let (status, _, revealed) = app
            .send(Method::POST, &unlock_uri, Some(&token), Some(json!({"password": "pw"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(revealed["content"], "the vault code is 1234");

        let note_uri = format!("/api/notes/{id}");
        let (status, _, updated) = app
            .send(Method::PUT, &note_uri, Some(&token), Some(json!({"is_locked": false})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["is_locked"], false);
        assert_eq!(updated["content"], "the vault code is 1234");

        let (status, _, body) = app.send(Method::DELETE, &note_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Note deleted");

        let (status, _, _) = app.send(Method::DELETE, &note_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn partial_update_touches_only_given_fields() {
        let app = TestApp::new();
        let token = app.login_as("heidi").await;

        let (_, _, created) = app
            .send(
                Method::POST,
                "/api/notes",
                Some(&token),
                Some(json!({"title": "Plan", "content": "Body", "tags": ["x"]})),
            )
            .await;
        let id = created["id"].as_str().unwrap();

        let (status, _, updated) = app
            .send(
                Method::PUT,
                &format!("/api/notes/{id}"),
                Some(&token),
                Some(json!({"color": "#ff0000"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["color"], "#ff0000");
        assert_eq!(updated["title"], "Plan");
        assert_eq!(updated["content"], "Body");
        assert_eq!(updated["tags"], json!(["x"]));
        let timestamp = |v: &Value| {
            v.as_str()
                .unwrap()
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap()
        };
        assert!(timestamp(&updated["updated_at"]) >= timestamp(&created["updated_at"]));
    }

    #[tokio::test]
    async fn users_cannot_touch_each_others_notes() {
        let app = TestApp::new();
        let alice = app.login_as("alice").await;
        let mallory = app.login_as("mallory").await;

        let (_, _, created) = app
            .send(
                Method::POST,
                "/api/notes",
                Some(&alice),
                Some(json!({"content": "private", "password": "pw"})),
            )
            .await;
        let id = created["id"].as_str().unwrap();
        let note_uri = format!("/api/notes/{id}");

        let (status, _, _) = app.send(Method::GET, &note_uri, Some(&mallory), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = app
            .send(Method::PUT, &note_uri, Some(&mallory), Some(json!({"title": "pwned"})))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = app
            .send(
                Method::POST,
                &format!("{note_uri}/unlock"),
                Some(&mallory),
                Some(json!({"password": "pw"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = app.send(Method::DELETE, &note_uri, Some(&mallory), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, _, listed) = app.send(Method::GET, "/api/notes", Some(&mallory), None).await;
        assert_eq!(listed, json!([]));
        let (status, _, _) = app.send(Method::GET, &note_uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn tag_and_text_search_over_http() {
        let app = TestApp::new();
        let token = app.login_as("ivan").await;
        app.send(
            Method::POST,
            "/api/notes",
            Some(&token),
            Some(json!({"content": "Prepare slides", "tags": ["work", "urgent"]})),
        )
        .await;

        let (_, _, hits) = app
            .send(Method::GET, "/api/notes?q=tag:urgent", Some(&token), None)
            .await;
        assert_eq!(hits.as_array().unwrap().len(), 1);
        let (_, _, misses) = app
            .send(Method::GET, "/api/notes?q=tag:personal", Some(&token), None)
            .await;
        assert!(misses.as_array().unwrap().is_empty());
        let (_, _, text) = app
            .send(Method::GET, "/api/notes?q=SLIDES", Some(&token), None)
            .await;
        assert_eq!(text.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = TestApp::new();
        let (status, _, body) = app.send(Method::GET, "/api-doc/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/api/notes/{note_id}/unlock").is_some());
    }
}

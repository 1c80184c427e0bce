//! HTTP API for the tournament server.
//!
//! # Modules
//!
//! - [`tournaments`]: Creation, listings, detail and joins
//! - [`chat`]: Per-tournament chat
//! - [`profiles`]: The caller's profile
//! - [`contact`]: Contact form
//! - [`middleware`]: Bearer token authentication for protected endpoints
//! - [`request_id`]: Request correlation, request logging and HTTP metrics
//! - [`error`]: JSON error responses
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                              - Health check (public)
//! GET  /api/v1/tournaments                  - Upcoming tournaments (public)
//! POST /api/v1/tournaments                  - Create tournament (auth required)
//! GET  /api/v1/tournaments/available        - Upcoming, not yet joined (auth required)
//! GET  /api/v1/tournaments/mine             - Created and joined (auth required)
//! POST /api/v1/tournaments/join             - Join by registration code (auth required)
//! GET  /api/v1/tournaments/{id}             - Detail with roster (auth required)
//! POST /api/v1/tournaments/{id}/join        - Join by id (auth required)
//! GET  /api/v1/tournaments/{id}/messages    - Poll chat (auth required)
//! POST /api/v1/tournaments/{id}/messages    - Post to chat (auth required)
//! GET  /api/v1/profile                      - Own profile (auth required)
//! PUT  /api/v1/profile                      - Save own profile (auth required)
//! POST /api/v1/contact                      - Send a contact message (public)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tm_server::api::{AppState, create_router};
//! use tournamate::{
//!     auth::TokenVerifier, chat::DEFAULT_MAX_MESSAGE_LEN, db::Repositories,
//!     events::LogPublisher, tournament::CodeAllocator,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let verifier = TokenVerifier::new("a-development-secret-of-32-chars!", None)?;
//! let state = AppState::new(
//!     &Repositories::in_memory(),
//!     Arc::new(LogPublisher),
//!     verifier,
//!     CodeAllocator::default(),
//!     DEFAULT_MAX_MESSAGE_LEN,
//! );
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod chat;
pub mod contact;
pub mod error;
pub mod middleware;
pub mod profiles;
pub mod request_id;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tournamate::{
    auth::TokenVerifier,
    chat::ChatManager,
    contact::ContactManager,
    db::{Repositories, TournamentRepository},
    events::EventPublisher,
    profile::ProfileManager,
    tournament::{CodeAllocator, TournamentManager},
};
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub tournament_manager: Arc<TournamentManager>,
    pub chat_manager: Arc<ChatManager>,
    pub profile_manager: Arc<ProfileManager>,
    pub contact_manager: Arc<ContactManager>,
    pub verifier: Arc<TokenVerifier>,
    /// Used by the health check
    pub tournaments: Arc<dyn TournamentRepository>,
}

impl AppState {
    /// Wire the managers over one set of repositories
    pub fn new(
        repos: &Repositories,
        publisher: Arc<dyn EventPublisher>,
        verifier: TokenVerifier,
        allocator: CodeAllocator,
        max_message_len: usize,
    ) -> Self {
        Self {
            tournament_manager: Arc::new(TournamentManager::new(
                repos,
                publisher.clone(),
                allocator,
            )),
            chat_manager: Arc::new(ChatManager::new(repos, publisher, max_message_len)),
            profile_manager: Arc::new(ProfileManager::new(repos.profiles.clone())),
            contact_manager: Arc::new(ContactManager::new(repos.contacts.clone())),
            verifier: Arc::new(verifier),
            tournaments: repos.tournaments.clone(),
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router(state: AppState) -> Router<AppState> {
    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/contact", post(contact::submit_contact));

    // Protected routes (require authentication middleware)
    let protected_routes = Router::new()
        .route("/tournaments", post(tournaments::create_tournament))
        .route("/tournaments/available", get(tournaments::list_available))
        .route("/tournaments/mine", get(tournaments::my_tournaments))
        .route("/tournaments/join", post(tournaments::join_by_code))
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{tournament_id}/join",
            post(tournaments::join_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/messages",
            get(chat::list_messages).post(chat::send_message),
        )
        .route(
            "/profile",
            get(profiles::get_profile).put(profiles::put_profile),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","storage":true,"version":"0.1.0","timestamp":"2026-10-15T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage_healthy = match state.tournaments.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            false
        }
    };

    let status_code = if storage_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if storage_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}

//! CertManager Backend
//!
//! REST backend for organizing certificates and awards: filtered listings,
//! detail lookups, mock create/delete and a single-user mock session.

mod api;
mod auth;
mod clock;
mod config;
mod db;
mod errors;
mod models;
mod notify;
mod query;
mod store;
mod view;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::AuthSession;
use clock::{Clock, TokioClock};
use config::Config;
use db::SessionRepository;
use models::{Award, Certificate, CreateAwardRequest, CreateCertificateRequest};
use notify::MemoryNotifications;
use store::RecordStore;
use view::LoadedPages;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub auth: Arc<AuthSession>,
    pub notifications: Arc<MemoryNotifications>,
    pub loaded_pages: Arc<LoadedPages>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CertManager Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    let pool = db::init_database(&config.db_path).await?;
    let clock: Arc<dyn Clock> = Arc::new(TokioClock);

    let store = Arc::new(RecordStore::seeded());
    tracing::info!(
        "Loaded {} certificates and {} awards",
        store.certificates().len(),
        store.awards().len()
    );

    let state = AppState {
        store,
        auth: Arc::new(AuthSession::new(
            SessionRepository::new(pool),
            clock.clone(),
            config.auth_delay,
        )),
        notifications: Arc::new(MemoryNotifications::new(
            clock.clone(),
            config.notification_capacity,
        )),
        loaded_pages: Arc::new(LoadedPages::default()),
        clock,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth = state.auth.clone();
    let session_auth = state.auth.clone();

    // Dashboard routes require the session token
    let dashboard_routes = Router::new()
        .route("/dashboard", get(api::get_dashboard))
        .route(
            "/certificates",
            get(api::list_records::<Certificate>)
                .post(api::create_record::<CreateCertificateRequest>),
        )
        .route("/certificates/query", post(api::apply_list_action::<Certificate>))
        .route(
            "/certificates/{id}",
            get(api::get_record::<Certificate>).delete(api::delete_record::<Certificate>),
        )
        .route(
            "/awards",
            get(api::list_records::<Award>).post(api::create_record::<CreateAwardRequest>),
        )
        .route("/awards/query", post(api::apply_list_action::<Award>))
        .route(
            "/awards/{id}",
            get(api::get_record::<Award>).delete(api::delete_record::<Award>),
        )
        .route("/notifications", get(api::drain_notifications))
        .layer(middleware::from_fn(move |req, next| {
            auth::session_auth_layer(auth.clone(), req, next)
        }));

    // Acting on the current session requires its token
    let session_routes = Router::new()
        .route("/logout", post(api::logout))
        .route("/me", get(api::current_user))
        .route("/profile", put(api::update_profile))
        .layer(middleware::from_fn(move |req, next| {
            auth::session_auth_layer(session_auth.clone(), req, next)
        }));

    let auth_routes = Router::new()
        .route("/login", post(api::login))
        .route("/signup", post(api::signup))
        .merge(session_routes);

    // Share links are public
    let share_routes = Router::new().route("/share/{id}", get(api::get_shared_certificate));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest(
            "/api",
            Router::new()
                .nest("/auth", auth_routes)
                .merge(share_routes)
                .merge(dashboard_routes),
        )
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AiService, AuthService, CannedAiService, LocalObjectStorage, ObjectStorage, S3ObjectStorage,
    SeaOrmAuthService,
};

pub mod ai;
pub mod analytics;
pub mod auth;
mod error;
pub mod observability;
pub mod pages;
pub mod posts;
pub mod settings;
mod types;
pub mod upload;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,

    pub storage: Arc<dyn ObjectStorage>,

    pub ai: Arc<dyn AiService>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let storage: Arc<dyn ObjectStorage> = if config.storage.backend == "s3" {
        Arc::new(S3ObjectStorage::new(&config.storage).await?)
    } else {
        Arc::new(LocalObjectStorage::new(&config.storage))
    };

    let auth: Arc<dyn AuthService> =
        Arc::new(SeaOrmAuthService::new(store.clone(), config.auth.clone()));

    Ok(Arc::new(AppState {
        config: Arc::new(RwLock::new(config)),
        store,
        auth,
        storage,
        ai: Arc::new(CannedAiService),
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let (cors_origins, secure_cookies, session_ttl_minutes, serve_local_uploads, local_path) = {
        let config = state.config.read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.auth.session_ttl_minutes,
            config.storage.backend == "local",
            config.storage.local_path.clone(),
        )
    };

    // Sessions live in the application database, not process memory, so
    // they survive restarts and are shared by every worker.
    let session_store = SqliteStore::new(state.store.conn.get_sqlite_connection_pool().clone());
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_ttl_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_router(state.clone()))
        .route("/posts", get(posts::list_posts))
        .route("/posts/{id}", get(posts::get_post))
        .route("/pages/{slug}", get(pages::get_page))
        .route("/landing", get(settings::get_landing))
        .route("/blog-settings", get(settings::get_blog_settings))
        .route("/global-settings", get(settings::get_global_settings))
        .route("/analytics", get(analytics::get_analytics))
        .route("/health", get(observability::health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let mut app = Router::new().nest("/api", api_router);

    if serve_local_uploads {
        app = app.nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(local_path),
        );
    }

    Ok(app
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            observability::rate_limit_headers_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state,
            observability::host_filter_middleware,
        )))
}

fn protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts", post(posts::create_post))
        .route("/posts/{id}", put(posts::update_post))
        .route("/posts/{id}", delete(posts::delete_post))
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/change-email", post(auth::change_email))
        .route("/landing", post(settings::save_landing))
        .route("/blog-settings", post(settings::save_blog_settings))
        .route("/global-settings", post(settings::save_global_settings))
        .route("/upload/image", post(upload::upload_image))
        .route("/ai/generate", post(ai::generate))
        .route("/ai/generate-image", post(ai::generate_image))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

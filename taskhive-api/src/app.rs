/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskhive_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskhive_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, routes};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use taskhive_shared::auth::middleware::{create_bearer_middleware, require_admin};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Gets the configured token lifetime
    pub fn token_ttl(&self) -> Duration {
        Duration::minutes(self.config.jwt.token_ttl_minutes)
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// Three access tiers, enforced by middleware layers:
///
/// ```text
/// /
/// ├── /health                              # public
/// ├── /auth/token                          # public (POST, form-encoded)
/// ├── /companies/                          # admin
/// │   ├── GET / POST    /
/// │   └── GET / PUT / DELETE  /:id
/// ├── /users/                              # admin
/// │   ├── GET / POST    /
/// │   └── GET / PUT / DELETE  /:id
/// └── /tasks/                              # authenticated, ownership-scoped
///     ├── GET / POST    /
///     ├── GET / PUT / DELETE  /:id
///     ├── GET  /user/:id                   # admin
///     ├── GET  /user/:id/completed         # admin
///     └── GET  /company/:id/completed      # admin
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Bearer authentication (per-tier)
/// 4. Admin role check (per-tier)
pub fn build_router(state: AppState) -> Router {
    let secret = state.jwt_secret().to_string();

    // Public routes (no token required)
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/token", post(routes::auth::issue));

    // Company management (admin tier)
    let company_routes = Router::new()
        .route("/", get(routes::companies::list).post(routes::companies::create))
        .route(
            "/:id",
            get(routes::companies::get)
                .put(routes::companies::update)
                .delete(routes::companies::delete),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn(create_bearer_middleware(secret.clone())));

    // User management (admin tier)
    let user_routes = Router::new()
        .route("/", get(routes::users::list).post(routes::users::create))
        .route(
            "/:id",
            get(routes::users::get)
                .put(routes::users::update)
                .delete(routes::users::delete),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn(create_bearer_middleware(secret.clone())));

    // Cross-user reports stay admin-only even though they live under /tasks
    let task_report_routes = Router::new()
        .route("/user/:id", get(routes::tasks::list_by_user))
        .route("/user/:id/completed", get(routes::tasks::list_completed_by_user))
        .route(
            "/company/:id/completed",
            get(routes::tasks::list_completed_by_company),
        )
        .layer(middleware::from_fn(require_admin));

    // Task routes (authenticated tier; handlers scope rows by caller role)
    let task_routes = Router::new()
        .route("/", get(routes::tasks::list).post(routes::tasks::create))
        .route(
            "/:id",
            get(routes::tasks::get)
                .put(routes::tasks::update)
                .delete(routes::tasks::delete),
        )
        .merge(task_report_routes)
        .layer(middleware::from_fn(create_bearer_middleware(secret)));

    Router::new()
        .merge(public_routes)
        .nest("/companies", company_routes)
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

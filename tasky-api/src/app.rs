/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasky_api::{app::{build_router, AppState}, config::Config, telemetry::Telemetry};
/// use tasky_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state, &Telemetry::disabled());
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, telemetry::Telemetry};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tasky_shared::{auth::jwt::SessionSigner, store::TodoStore};
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Shared application state
///
/// Cloned into every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend opened at startup
    pub store: Arc<dyn TodoStore>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Issues and verifies session tokens
    pub signer: SessionSigner,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn TodoStore>, config: Config) -> Self {
        let signer = SessionSigner::new(config.session.secret.clone(), config.session_ttl());

        Self {
            store,
            config: Arc::new(config),
            signer,
        }
    }

    /// Borrowed store handle for the service functions
    pub fn store(&self) -> &dyn TodoStore {
        self.store.as_ref()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /                       # Login page
/// ├── GET    /todo                   # Todo page (session cookie, else redirect to /)
/// ├── PUT    /todo                   # Update a todo (id in body)
/// ├── GET    /todo/:id               # Fetch one todo
/// ├── POST   /todo/:userid           # Add a todo for a user
/// ├── DELETE /todo/:userid/:id       # Delete one todo
/// ├── GET    /todos/:userid          # List a user's todos
/// ├── DELETE /todos/:userid          # Delete all of a user's todos
/// ├── POST   /signup
/// ├── POST   /login
/// ├── GET    /health
/// └── GET    /assets/*               # Static files
/// ```
///
/// Every `/todo` and `/todos` JSON route requires a session.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. CORS (tower-http CorsLayer)
/// 2. Request tracing (tower-http TraceLayer, via [`Telemetry::apply`])
pub fn build_router(state: AppState, telemetry: &Telemetry) -> Router {
    use crate::routes;

    let page_routes = Router::new()
        .route("/", get(routes::pages::login_page))
        .nest_service("/assets", ServeDir::new(&state.config.api.assets_dir));

    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login));

    // GET /todo/:id takes a todo id while POST /todo/:id takes a user id;
    // the router needs one parameter name per position.
    let todo_routes = Router::new()
        .route(
            "/todo",
            get(routes::pages::todo_page).put(routes::todos::update_todo),
        )
        .route(
            "/todo/:id",
            get(routes::todos::get_todo).post(routes::todos::add_todo),
        )
        .route("/todo/:id/:todo_id", delete(routes::todos::delete_todo))
        .route(
            "/todos/:userid",
            get(routes::todos::get_todos).delete(routes::todos::clear_all),
        );

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let cors = cors_layer(&state.config.api.cors_origins);

    let router = Router::new()
        .merge(page_routes)
        .merge(auth_routes)
        .merge(todo_routes)
        .merge(health_routes)
        .layer(cors)
        .with_state(state);

    telemetry.apply(router)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

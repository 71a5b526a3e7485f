//! Xpense Web Server
//!
//! Axum-based REST API for the Xpense finance tracker.
//!
//! Security features:
//! - Bearer-token sessions issued on login (every route except register/login)
//! - Restrictive CORS policy
//! - Input validation (image size and format, amounts, horizons)
//! - Audit logging for all writes
//! - Sanitized error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use xpense_core::db::Database;

mod handlers;
pub mod sessions;

pub use sessions::{SessionContext, SessionManager, DEFAULT_SESSION_TIMEOUT};

/// Maximum request body size. Images are capped at 10 MB and travel as base64 in JSON.
pub const MAX_REQUEST_BODY: usize = 16 * 1024 * 1024;

/// Maximum page size for list endpoints
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Environment variable holding a comma-separated list of allowed CORS origins
pub const ALLOWED_ORIGINS_ENV: &str = "XPENSE_ALLOWED_ORIGINS";

/// Authorization header carrying the session token
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Idle time after which a session token stops working
    pub session_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}

/// Parse a comma-separated origin list, skipping blanks
pub fn parse_allowed_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub sessions: SessionManager,
}

/// Authentication middleware - resolves the bearer token to a session
///
/// On success the [`SessionContext`] is attached to the request so handlers can
/// scope every query to the logged-in user.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    if let Some(token) = token {
        if let Some(ctx) = state.sessions.resolve(&token).await {
            tracing::debug!(user = %ctx.username, path = %request.uri().path(), "Authenticated via session");
            request.extensions_mut().insert(ctx);
            return next.run(request).await;
        }
        warn!(path = %request.uri().path(), "Unknown or expired session token");
    } else {
        warn!(path = %request.uri().path(), "Unauthorized request - no session token");
    }

    AppError::unauthorized("Authentication required").into_response()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        db,
        sessions: SessionManager::new(config.session_timeout),
        config: config.clone(),
    });

    let public_routes = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login));

    let protected_routes = Router::new()
        // Session
        .route("/auth/logout", post(handlers::logout))
        .route("/me", get(handlers::get_me))
        // Dashboard
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/dashboard/periods", get(handlers::get_periods))
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/:id",
            get(handlers::get_transaction)
                .put(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        )
        .route("/transactions/:id/receipt", get(handlers::get_receipt))
        // Forecast
        .route("/forecast", post(handlers::create_forecast))
        // Account settings
        .route("/account", axum::routing::delete(handlers::delete_account))
        .route("/account/display-name", put(handlers::update_display_name))
        .route("/account/username", put(handlers::update_username))
        .route("/account/password", put(handlers::update_password))
        .route(
            "/account/emergency-rate",
            put(handlers::update_emergency_rate),
        )
        .route(
            "/account/photo",
            get(handlers::get_profile_picture)
                .put(handlers::update_profile_picture)
                .delete(handlers::delete_profile_picture),
        )
        .route("/account/audit", get(handlers::list_audit_log))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // CSP: same-origin scripts, inline styles for the chart library, data:/blob: for receipts
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(db, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !db.is_encrypted().unwrap_or(false) {
        warn!("⚠️  Database is not encrypted - set XPENSE_DB_KEY for production use");
    }
    if !config.allowed_origins.is_empty() {
        info!(origins = ?config.allowed_origins, "CORS enabled for extra origins");
    }

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<xpense_core::Error> for AppError {
    fn from(err: xpense_core::Error) -> Self {
        use xpense_core::Error;

        match err {
            Error::InvalidData(msg) | Error::InsufficientData(msg) => Self::bad_request(&msg),
            Error::InvalidCredentials => Self::unauthorized("Invalid username or password"),
            Error::NotFound(msg) => Self::not_found(&msg),
            Error::Conflict(msg) => Self::conflict(&msg),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                // Keep full error for logging
                internal: Some(anyhow::Error::new(other)),
            },
        }
    }
}

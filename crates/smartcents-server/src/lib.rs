//! SmartCents Web Server
//!
//! Axum-based REST API over the SmartCents application context.
//!
//! Security features:
//! - Optional API key authentication (`SMARTCENTS_API_KEYS`)
//! - Restrictive CORS policy (configured origins only)
//! - Sanitized error responses

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use smartcents_core::{
    Database, ServerSettings, SmartCents, TipClient, TipGenerator,
};

mod handlers;

/// Environment variable holding comma-separated API keys
pub const API_KEYS_ENV: &str = "SMARTCENTS_API_KEYS";

/// Maximum accepted length of a chatbot message
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as `Authorization: Bearer <key>`; empty disables auth
    pub api_keys: Vec<String>,
}

impl ServerConfig {
    /// Origins from the config file, API keys from `SMARTCENTS_API_KEYS`
    pub fn from_settings(settings: &ServerSettings) -> Self {
        let api_keys = std::env::var(API_KEYS_ENV)
            .map(|v| parse_api_keys(&v))
            .unwrap_or_default();
        Self {
            allowed_origins: settings.allowed_origins.clone(),
            api_keys,
        }
    }

    pub fn require_auth(&self) -> bool {
        !self.api_keys.is_empty()
    }
}

/// Split a comma-separated key list, dropping blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Shared application state
pub struct AppState {
    /// Core operations are synchronous; never hold this across an `.await`
    pub app: Mutex<SmartCents<Database>>,
    pub tips: TipClient,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(app: SmartCents<Database>, tips: TipClient, config: ServerConfig) -> Self {
        Self {
            app: Mutex::new(app),
            tips,
            config,
        }
    }

    /// Lock the application context
    pub fn app(&self) -> Result<MutexGuard<'_, SmartCents<Database>>, AppError> {
        self.app.lock().map_err(|_| {
            error!("Application state lock poisoned");
            AppError::internal("An internal error occurred")
        })
    }
}

/// Authentication middleware - validates API keys when any are configured
///
/// Keys are compared in constant time.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth() {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        tracing::debug!(path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid API key");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key using constant-time comparison
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();
    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Response for operations that don't return data
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(app: SmartCents<Database>, tips: TipClient, config: ServerConfig) -> Router {
    info!(
        backend = tips.backend_name(),
        model = tips.model(),
        "Tip generator ready"
    );
    let state = Arc::new(AppState::new(app, tips, config.clone()));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions)
                .post(handlers::create_transaction)
                .delete(handlers::reset_transactions),
        )
        // Goals
        .route(
            "/goals",
            get(handlers::list_goals)
                .post(handlers::create_goal)
                .delete(handlers::reset_goals),
        )
        .route("/goals/predictions", get(handlers::goal_predictions))
        .route("/goals/:id", axum::routing::delete(handlers::delete_goal))
        .route("/goals/:id/progress", post(handlers::add_goal_progress))
        // Score
        .route("/score", get(handlers::get_score))
        .route("/score/log", get(handlers::get_change_log))
        .route("/score/history", get(handlers::get_history))
        .route("/summary", get(handlers::get_summary))
        // Challenges
        .route("/challenges", get(handlers::list_challenges))
        .route("/challenges/reset", post(handlers::reset_challenges))
        .route("/challenges/:id/complete", post(handlers::complete_challenge))
        // Mentor
        .route("/mentor-tip", post(handlers::mentor_tip))
        .route("/chatbot", post(handlers::chatbot));

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
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

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server
pub async fn serve(
    app: SmartCents<Database>,
    tips: TipClient,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if config.require_auth() {
        info!(keys = config.api_keys.len(), "API key authentication enabled");
    } else {
        warn!("Authentication disabled - do not expose to network!");
    }

    check_tip_backend(&tips).await;

    let router = create_router(app, tips, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Log whether the tip backend is reachable
async fn check_tip_backend(tips: &TipClient) {
    if tips.is_local() {
        info!("Using local rule-based tips (set TIP_BACKEND to enable a model)");
    } else if tips.health_check().await {
        info!(host = tips.host(), model = tips.model(), "Tip backend connected");
    } else {
        warn!(
            host = tips.host(),
            model = tips.model(),
            "Tip backend configured but not responding; rule-based tips will be used"
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
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
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        // Validation and lookup failures are the caller's fault; say why
        match err.downcast_ref::<smartcents_core::Error>() {
            Some(smartcents_core::Error::InvalidData(msg)) => Self::bad_request(msg),
            Some(smartcents_core::Error::NotFound(msg)) => {
                Self::not_found(&format!("Not found: {}", msg))
            }
            _ => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "An internal error occurred".to_string(),
                internal: Some(err),
            },
        }
    }
}

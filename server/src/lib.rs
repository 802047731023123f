//! HTTP API for the Keygate activation service.

mod admin;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use keygate_activation::{
    ActivationError, ActivationResult, ActivationService, AuthoritySource, BindingStore,
    HttpAuthority, OpenAuthority, DEFAULT_AUTHORITY_TIMEOUT,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::error;

pub use admin::render_admin_page;

/// Where the authority list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityConfig {
    /// Fetch a newline-separated list from `url` on every activation.
    Remote { url: String, timeout: Duration },
    /// Accept any key on first use.
    Open,
}

impl AuthorityConfig {
    /// A remote authority with the default fetch timeout.
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote {
            url: url.into(),
            timeout: DEFAULT_AUTHORITY_TIMEOUT,
        }
    }
}

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path of the JSON binding store.
    pub data_file: PathBuf,
    pub authority: AuthorityConfig,
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: ActivationService,
}

impl AppState {
    pub fn new(service: ActivationService) -> Self {
        Self { service }
    }

    /// Builds the store and authority source described by `config`.
    pub fn from_config(config: &ServerConfig) -> ActivationResult<Self> {
        let authority: Arc<dyn AuthoritySource> = match &config.authority {
            AuthorityConfig::Remote { url, timeout } => {
                Arc::new(HttpAuthority::new(url.clone(), *timeout)?)
            }
            AuthorityConfig::Open => Arc::new(OpenAuthority),
        };
        let store = Arc::new(BindingStore::new(config.data_file.clone()));
        Ok(Self::new(ActivationService::new(store, authority)))
    }
}

/// Body of `POST /verify`. Absent or null fields are rejected as missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyRequest {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

/// The `{"status": ..., "message": ...}` envelope used by every JSON response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    fn success(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Errors returned from handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request body was not a valid [`VerifyRequest`].
    BadRequest(String),
    Activation(ActivationError),
}

impl From<ActivationError> for ApiError {
    fn from(err: ActivationError) -> Self {
        Self::Activation(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Activation(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn message(&self) -> String {
        let err = match self {
            Self::BadRequest(detail) => return format!("Invalid request body: {detail}"),
            Self::Activation(err) => err,
        };
        let message = match err {
            ActivationError::MissingField => "Missing UUID or key",
            ActivationError::KeyAlreadyBound => "Key already used with a different UUID",
            ActivationError::KeyNotAuthorized => "Invalid key",
            ActivationError::AuthorityUnavailable(_) => "Failed to fetch key list",
            ActivationError::KeyNotFound => "Key not found",
            ActivationError::Io(_)
            | ActivationError::Serialization(_)
            | ActivationError::Storage(_) => "Internal server error",
        };
        message.to_string()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Activation(err) = &self {
            if !err.is_client_error() {
                error!("Request failed: {}", err);
            }
        }
        let status = self.status();
        (status, Json(StatusResponse::error(self.message()))).into_response()
    }
}

async fn verify_handler(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) = payload?;
    let key = request.key.as_deref().unwrap_or_default();
    let uuid = request.uuid.as_deref().unwrap_or_default();
    state.service.activate(key, uuid).await?;
    Ok(Json(StatusResponse::success("Key verified")))
}

async fn admin_handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let bindings = state.service.list_bindings().await?;
    Ok(Html(render_admin_page(&bindings)))
}

async fn remove_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.service.remove_binding(&key).await?;
    Ok(Json(StatusResponse::success("Key removed")))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "keygate",
    })
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/verify", post(verify_handler))
        .route("/admin", get(admin_handler))
        .route("/remove_key/{key}", post(remove_key_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

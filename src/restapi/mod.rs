#![allow(clippy::result_large_err)] // HTTP helpers return AppError for consistent diagnostics.

//! HTTP transport for the engine: POST a workflow document, get the run's
//! records back in the response body.

use crate::core::engine::Engine;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use axum::{
    body::{Body, Bytes},
    extract::Extension,
    http::{header, HeaderMap, HeaderValue, Response, StatusCode},
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use subtle::ConstantTimeEq;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::util::MapResponseLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

/// Largest accepted document body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// REST server configuration.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token required on every request; `None` disables auth.
    pub auth_token: Option<String>,
}

/// State shared across requests.
struct ServerState {
    auth_token: Option<String>,
}

/// Start the REST listener and block until the service terminates.
pub async fn serve(config: ServerConfig) -> Result<(), AppError> {
    serve_internal(config, None).await
}

/// Start the REST listener and notify once the bind address is known (test helper).
pub async fn serve_with_ready_notifier(
    config: ServerConfig,
    ready_notifier: oneshot::Sender<SocketAddr>,
) -> Result<(), AppError> {
    serve_internal(config, Some(ready_notifier)).await
}

async fn serve_internal(
    config: ServerConfig,
    ready_notifier: Option<oneshot::Sender<SocketAddr>>,
) -> Result<(), AppError> {
    let state = Arc::new(ServerState {
        auth_token: config.auth_token,
    });
    let router = Router::new()
        .route("/", post(handle_run))
        .layer(Extension(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(MapResponseLayer::new(|mut response: Response<Body>| {
            if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
                let body = json!({
                    "error": {
                        "code": "RBK-REST-413",
                        "message": "payload too large"
                    }
                })
                .to_string();
                *response.body_mut() = Body::from(body);
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
            }
            response
        }));

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|err| {
            AppError::new(
                ErrorCategory::IoError,
                format!(
                    "failed to bind rest listener {}:{}: {}",
                    config.host, config.port, err
                ),
            )
        })?;
    let local_addr = listener.local_addr().map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to determine rest listener address: {}", err),
        )
    })?;
    if let Some(tx) = ready_notifier {
        let _ = tx.send(local_addr);
    }
    info!("rest server listening on {}", local_addr);
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| {
            AppError::new(
                ErrorCategory::NetworkError,
                format!("rest server terminated: {}", err),
            )
        })
}

async fn handle_run(
    Extension(state): Extension<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response<Body>, RestRejection> {
    if let Some(expected) = state.auth_token.as_deref() {
        if !is_authorized(&headers, expected) {
            return Err(RestRejection::unauthorized());
        }
    }

    // Every request gets its own engine and response buffer; the rest sink
    // collects one JSON record per line.
    let buffer = Arc::new(Mutex::new(String::new()));
    let engine = Engine::new().with_rest_buffer(buffer.clone());
    if let Err(err) = engine.execute(&body, false).await {
        return Err(RestRejection::bad_document(err));
    }

    let records = buffer.lock().map(|b| b.clone()).unwrap_or_default();
    let mut response = Response::new(Body::from(records));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-ndjson"),
    );
    Ok(response)
}

fn is_authorized(headers: &HeaderMap, expected: &str) -> bool {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);
    if let Some(token) = header_value {
        token.as_bytes().ct_eq(expected.as_bytes()).into()
    } else {
        false
    }
}

struct RestRejection {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl RestRejection {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "RBK-REST-401",
            message: "unauthorized".to_string(),
        }
    }

    fn bad_document(err: AppError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "RBK-REST-400",
            message: err.message,
        }
    }
}

impl IntoResponse for RestRejection {
    fn into_response(self) -> Response<Body> {
        let mut resp = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message
            }
        }))
        .into_response();
        *resp.status_mut() = self.status;
        resp
    }
}

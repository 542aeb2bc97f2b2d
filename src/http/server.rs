//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener and shut down gracefully
//! - Hand routing requests to the `Router`

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::admin::setup_admin_router;
use crate::config::RouterConfig;
use crate::routing::{FailureKind, Router, RoutingRequest, RoutingResult};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    pub admin_key: Arc<str>,
}

/// HTTP front end for the router.
pub struct HttpServer {
    app: axum::Router,
    config: RouterConfig,
}

impl HttpServer {
    pub fn new(router: Arc<Router>, config: RouterConfig) -> Self {
        let state = AppState {
            router,
            admin_key: Arc::from(config.admin.api_key.as_str()),
        };
        let app = Self::build_router(&config, state);
        Self { app, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> axum::Router {
        let mut app = axum::Router::new()
            .route("/v1/route", post(route_handler))
            .route("/health", get(health_handler));

        if config.admin.enabled {
            app = app.merge(setup_admin_router(state.clone()));
        }

        app.with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            admin_enabled = self.config.admin.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Route one request. Adopts `x-request-id` as the request id when it is a UUID.
async fn route_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut request): Json<RoutingRequest>,
) -> Response {
    if let Some(id) = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
    {
        request.id = id;
    }

    let result = state.router.route(request).await;
    let status = match &result {
        RoutingResult::Success(_) => StatusCode::OK,
        RoutingResult::Failure(f) if f.kind == FailureKind::Cancelled => StatusCode::REQUEST_TIMEOUT,
        RoutingResult::Failure(f) if f.kind == FailureKind::Exhausted => StatusCode::BAD_GATEWAY,
        RoutingResult::Failure(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(result)).into_response()
}

#[derive(Serialize)]
struct Liveness {
    version: &'static str,
    status: &'static str,
    healthy_backends: usize,
    total_backends: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<Liveness> {
    let report = state.router.status();
    Json(Liveness {
        version: env!("CARGO_PKG_VERSION"),
        status: if report.healthy_backends > 0 { "operational" } else { "degraded" },
        healthy_backends: report.healthy_backends,
        total_backends: report.total_backends,
    })
}

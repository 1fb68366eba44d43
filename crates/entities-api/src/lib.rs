//! # entities-api: Versioned REST API for the Entity Resource
//!
//! Axum service exposing CRUD operations over entities under
//! `/api/{version}/entities`. Handlers bind and validate requests, delegate
//! to the [`EntityBackend`](entities_core::EntityBackend) held in
//! [`AppState`], and translate results into HTTP responses.
//!
//! ## API Surface
//!
//! | Prefix                         | Module                  | Purpose              |
//! |--------------------------------|-------------------------|----------------------|
//! | `/api/{version}/entities/*`    | [`routes::entities`]    | Entity CRUD          |
//! | `/openapi.json`, `/swagger/*`  | [`openapi`]             | API documentation    |
//! | `/health/*`                    | this module             | Liveness, readiness  |
//! | `/metrics`                     | this module             | Prometheus scrape    |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! ReportApiVersions → TraceLayer → MetricsMiddleware → RequireSupportedVersion → Handler
//! ```

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod versioning;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};

use crate::middleware::metrics::ApiMetrics;

pub use crate::error::AppError;
pub use crate::state::{AppConfig, AppState};

/// Assemble the full application router with all routes and middleware.
///
/// Health probes and `/metrics` sit outside the request metrics, but every
/// response, including errors and unknown routes, carries the
/// `api-supported-versions` header.
pub fn app(state: AppState) -> Router {
    let metrics_on = state.config.metrics_enabled;
    let metrics = ApiMetrics::new();

    let mut api = Router::new()
        .merge(routes::entities::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(middleware::tracing_layer::layer())
        .with_state(state);

    let mut probes = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    if metrics_on {
        probes = probes
            .route("/metrics", get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    Router::new()
        .merge(probes)
        .merge(api)
        .layer(from_fn(versioning::report_api_versions))
}

/// GET /metrics: Prometheus metrics scrape endpoint.
async fn prometheus_metrics(Extension(metrics): Extension<ApiMetrics>) -> impl IntoResponse {
    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 `ready` once the router is serving.
async fn readiness() -> &'static str {
    "ready"
}

use crate::infra::{AppState, Services};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use rentflow::workflows::applications::application_router;
use rentflow::workflows::leads::lead_router;
use rentflow::workflows::messaging::messaging_router;
use rentflow::workflows::profiles::profile_router;
use rentflow::workflows::properties::property_router;
use serde_json::json;

/// Every workflow router plus the operational endpoints.
pub(crate) fn service_router(services: &Services) -> axum::Router {
    property_router(services.properties.clone())
        .merge(profile_router(services.profiles.clone()))
        .merge(application_router(services.applications.clone()))
        .merge(lead_router(services.leads.clone()))
        .merge(messaging_router(services.messaging.clone()))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

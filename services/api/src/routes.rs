use crate::infra::AppState;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use stand_ops::market::applications::{
    application_router, ApplicationRepository, JustificationWriter, MarketApplicationService,
    NotificationSender, PriceConfigSource, RejectionReason, TemplateJustificationWriter,
};
use stand_ops::market::geocode::{geocode_batch, Geocoder};
use stand_ops::market::pricing::PriceConfig;
use std::sync::Arc;
use std::time::Duration;

pub(crate) fn with_application_routes<R, N, P, G>(
    service: Arc<MarketApplicationService<R, N, P>>,
    geocoder: Arc<G>,
    geocode_pace: Duration,
) -> axum::Router
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
    G: Geocoder + 'static,
{
    let stats_service = service.clone();
    let map_service = service.clone();
    application_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/editions/stats",
            axum::routing::get(move |query: Query<StatsQuery>| {
                let service = stats_service.clone();
                async move { stats_endpoint(query, service).await }
            }),
        )
        .route(
            "/api/v1/editions/config",
            axum::routing::put(upsert_config_endpoint),
        )
        .route(
            "/api/v1/map/points",
            axum::routing::get(move || {
                let service = map_service.clone();
                let geocoder = geocoder.clone();
                async move { map_points_endpoint(service, geocoder, geocode_pace).await }
            }),
        )
        .route(
            "/api/v1/rejection-draft",
            axum::routing::post(rejection_draft_endpoint),
        )
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatsQuery {
    pub(crate) year: Option<i32>,
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

pub(crate) async fn stats_endpoint<R, N, P>(
    Query(query): Query<StatsQuery>,
    service: Arc<MarketApplicationService<R, N, P>>,
) -> axum::response::Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
{
    match service.stats(query.year) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

/// Resolve every stand with a submitted declaration to map coordinates.
/// Lookups are paced upstream, so the response time grows with the number of
/// confirmed stands; the dashboard caches the result between edits.
pub(crate) async fn map_points_endpoint<R, N, P, G>(
    service: Arc<MarketApplicationService<R, N, P>>,
    geocoder: Arc<G>,
    pace: Duration,
) -> axum::response::Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
    G: Geocoder + 'static,
{
    let records = match service.list() {
        Ok(records) => records,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    };

    let confirmed = records
        .into_iter()
        .filter(|record| record.status.has_details())
        .collect();
    let points = geocode_batch(geocoder, confirmed, pace).collect().await;
    (StatusCode::OK, Json(points)).into_response()
}

pub(crate) async fn upsert_config_endpoint(
    Extension(state): Extension<AppState>,
    Json(config): Json<PriceConfig>,
) -> impl IntoResponse {
    let year = config.year;
    state.pricing.upsert(config);
    (StatusCode::OK, Json(json!({ "year": year })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectionDraftRequest {
    pub(crate) applicant_name: String,
    pub(crate) summary: String,
    #[serde(default)]
    pub(crate) reasons: Vec<RejectionReason>,
}

pub(crate) async fn rejection_draft_endpoint(
    Json(request): Json<RejectionDraftRequest>,
) -> Json<serde_json::Value> {
    let writer = TemplateJustificationWriter;
    let draft = writer.generate(&request.applicant_name, &request.summary, &request.reasons);
    Json(json!({ "justification": draft }))
}

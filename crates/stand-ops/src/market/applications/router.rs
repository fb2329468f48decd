use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, StandDetailsForm};
use super::lifecycle::{LifecycleError, LifecycleEvent};
use super::repository::{
    ApplicationRepository, NotificationSender, PriceConfigSource, RepositoryError,
};
use super::service::{ApplicationServiceError, MarketApplicationService};

/// Router builder exposing the transition and read endpoints for the
/// committee dashboard.
pub fn application_router<R, N, P>(
    service: Arc<MarketApplicationService<R, N, P>>,
) -> Router
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
{
    Router::new()
        .route("/api/v1/applications", get(list_handler::<R, N, P>))
        .route(
            "/api/v1/applications/:application_id",
            get(detail_handler::<R, N, P>),
        )
        .route(
            "/api/v1/applications/:application_id/accept",
            post(accept_handler::<R, N, P>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            post(reject_handler::<R, N, P>),
        )
        .route(
            "/api/v1/applications/:application_id/details",
            post(details_handler::<R, N, P>),
        )
        .route(
            "/api/v1/applications/:application_id/validate",
            post(validate_handler::<R, N, P>),
        )
        .route(
            "/api/v1/applications/:application_id/notifications/resend",
            post(resend_handler::<R, N, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AcceptRequest {
    #[serde(default)]
    pub(crate) message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectRequest {
    pub(crate) justification: String,
}

fn error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::Lifecycle(LifecycleError::InvalidTransition { .. }) => {
            StatusCode::CONFLICT
        }
        ApplicationServiceError::Lifecycle(LifecycleError::InvalidInput { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn accept_handler<R, N, P>(
    State(service): State<Arc<MarketApplicationService<R, N, P>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<AcceptRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
{
    let id = ApplicationId(application_id);
    let event = LifecycleEvent::Accept {
        message: request.message,
    };
    match service.apply(&id, event) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<R, N, P>(
    State(service): State<Arc<MarketApplicationService<R, N, P>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<RejectRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
{
    let id = ApplicationId(application_id);
    let event = LifecycleEvent::Reject {
        justification: request.justification,
    };
    match service.apply(&id, event) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn details_handler<R, N, P>(
    State(service): State<Arc<MarketApplicationService<R, N, P>>>,
    Path(application_id): Path<String>,
    axum::Json(form): axum::Json<StandDetailsForm>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
{
    let id = ApplicationId(application_id);
    let event = LifecycleEvent::SubmitDetails {
        details: form.into_details(),
    };
    match service.apply(&id, event) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn validate_handler<R, N, P>(
    State(service): State<Arc<MarketApplicationService<R, N, P>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
{
    let id = ApplicationId(application_id);
    match service.apply(&id, LifecycleEvent::Validate) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resend_handler<R, N, P>(
    State(service): State<Arc<MarketApplicationService<R, N, P>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
{
    let id = ApplicationId(application_id);
    match service.resend_notification(&id) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, N, P>(
    State(service): State<Arc<MarketApplicationService<R, N, P>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
{
    match service.list() {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.status_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detail_handler<R, N, P>(
    State(service): State<Arc<MarketApplicationService<R, N, P>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    P: PriceConfigSource + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

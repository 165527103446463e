use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use crate::actor::ActingUser;
use crate::workflows::properties::PropertyId;
use crate::workflows::store::RepositoryError;

use super::domain::ApplicationId;
use super::form::ApplicationForm;
use super::repository::{ApplicationEventPublisher, ApplicationRepository};
use super::service::{
    ApplicationService, ApplicationServiceError, DraftSubmission, StatusChangeRequest,
};

/// Router exposing the tenant wizard and the manager review endpoints.
pub fn application_router<R, E>(service: Arc<ApplicationService<R, E>>) -> Router
where
    R: ApplicationRepository + 'static,
    E: ApplicationEventPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties/:property_id/apply/draft",
            post(draft_handler::<R, E>),
        )
        .route(
            "/api/v1/properties/:property_id/apply",
            post(submit_handler::<R, E>),
        )
        .route(
            "/api/v1/properties/:property_id/application",
            get(tenant_application_handler::<R, E>),
        )
        .route(
            "/api/v1/properties/:property_id/applications",
            get(list_handler::<R, E>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(manager_get_handler::<R, E>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(status_handler::<R, E>),
        )
        .route(
            "/api/v1/applications/:application_id/withdraw",
            post(withdraw_handler::<R, E>),
        )
        .with_state(service)
}

pub(crate) async fn draft_handler<R, E>(
    State(service): State<Arc<ApplicationService<R, E>>>,
    ActingUser(tenant): ActingUser,
    Path(property_id): Path<String>,
    Json(submission): Json<DraftSubmission>,
) -> Result<Response, ApplicationServiceError>
where
    R: ApplicationRepository + 'static,
    E: ApplicationEventPublisher + 'static,
{
    let outcome = service.save_draft(&tenant, &PropertyId(property_id), submission)?;
    Ok(Json(outcome).into_response())
}

pub(crate) async fn submit_handler<R, E>(
    State(service): State<Arc<ApplicationService<R, E>>>,
    ActingUser(tenant): ActingUser,
    Path(property_id): Path<String>,
    Json(form): Json<ApplicationForm>,
) -> Result<Response, ApplicationServiceError>
where
    R: ApplicationRepository + 'static,
    E: ApplicationEventPublisher + 'static,
{
    let application = service.submit(&tenant, &PropertyId(property_id), form)?;
    Ok((StatusCode::ACCEPTED, Json(application)).into_response())
}

pub(crate) async fn tenant_application_handler<R, E>(
    State(service): State<Arc<ApplicationService<R, E>>>,
    ActingUser(tenant): ActingUser,
    Path(property_id): Path<String>,
) -> Result<Response, ApplicationServiceError>
where
    R: ApplicationRepository + 'static,
    E: ApplicationEventPublisher + 'static,
{
    let application = service.get_for_tenant(&tenant, &PropertyId(property_id))?;
    Ok(Json(application).into_response())
}

pub(crate) async fn list_handler<R, E>(
    State(service): State<Arc<ApplicationService<R, E>>>,
    ActingUser(manager): ActingUser,
    Path(property_id): Path<String>,
) -> Result<Response, ApplicationServiceError>
where
    R: ApplicationRepository + 'static,
    E: ApplicationEventPublisher + 'static,
{
    let summaries = service.list_for_property(&manager, &PropertyId(property_id))?;
    Ok(Json(summaries).into_response())
}

pub(crate) async fn manager_get_handler<R, E>(
    State(service): State<Arc<ApplicationService<R, E>>>,
    ActingUser(manager): ActingUser,
    Path(application_id): Path<String>,
) -> Result<Response, ApplicationServiceError>
where
    R: ApplicationRepository + 'static,
    E: ApplicationEventPublisher + 'static,
{
    let application = service.get_for_manager(&manager, &ApplicationId(application_id))?;
    Ok(Json(application).into_response())
}

pub(crate) async fn status_handler<R, E>(
    State(service): State<Arc<ApplicationService<R, E>>>,
    ActingUser(manager): ActingUser,
    Path(application_id): Path<String>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Response, ApplicationServiceError>
where
    R: ApplicationRepository + 'static,
    E: ApplicationEventPublisher + 'static,
{
    let application =
        service.transition_status(&manager, &ApplicationId(application_id), request)?;
    Ok(Json(application).into_response())
}

pub(crate) async fn withdraw_handler<R, E>(
    State(service): State<Arc<ApplicationService<R, E>>>,
    ActingUser(tenant): ActingUser,
    Path(application_id): Path<String>,
) -> Result<Response, ApplicationServiceError>
where
    R: ApplicationRepository + 'static,
    E: ApplicationEventPublisher + 'static,
{
    let application = service.withdraw(&tenant, &ApplicationId(application_id))?;
    Ok(Json(application).into_response())
}

impl IntoResponse for ApplicationServiceError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApplicationServiceError::Validation { errors } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": message, "errors": errors })),
            )
                .into_response(),
            ApplicationServiceError::NotFound | ApplicationServiceError::PropertyNotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApplicationServiceError::Forbidden => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": message }))).into_response()
            }
            ApplicationServiceError::PropertyClosed(_)
            | ApplicationServiceError::PropertyLeased
            | ApplicationServiceError::NotEditable(_)
            | ApplicationServiceError::Transition(_)
            | ApplicationServiceError::Repository(RepositoryError::Conflict) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            ApplicationServiceError::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApplicationServiceError::Repository(_) | ApplicationServiceError::Events(_) => {
                error!(error = %message, "application workflow failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::actor::ActingUser;
use crate::workflows::properties::PropertyId;
use crate::workflows::store::RepositoryError;

use super::domain::{LeadId, LeadInvite, LeadStatus};
use super::repository::LeadRepository;
use super::service::{LeadService, LeadServiceError};

#[derive(Debug, Deserialize)]
pub struct LeadStatusRequest {
    pub status: LeadStatus,
}

#[derive(Debug, Deserialize)]
pub struct LeadImportRequest {
    pub csv: String,
}

pub fn lead_router<R>(service: Arc<LeadService<R>>) -> Router
where
    R: LeadRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties/:property_id/leads",
            post(invite_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/v1/properties/:property_id/leads/import",
            post(import_handler::<R>),
        )
        .route("/api/v1/leads/:lead_id", get(get_handler::<R>))
        .route("/api/v1/leads/:lead_id/status", post(status_handler::<R>))
        .with_state(service)
}

pub(crate) async fn invite_handler<R>(
    State(service): State<Arc<LeadService<R>>>,
    ActingUser(manager): ActingUser,
    Path(property_id): Path<String>,
    Json(invite): Json<LeadInvite>,
) -> Result<Response, LeadServiceError>
where
    R: LeadRepository + 'static,
{
    let lead = service.invite(&manager, &PropertyId(property_id), invite)?;
    Ok((StatusCode::CREATED, Json(lead)).into_response())
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<LeadService<R>>>,
    ActingUser(manager): ActingUser,
    Path(property_id): Path<String>,
) -> Result<Response, LeadServiceError>
where
    R: LeadRepository + 'static,
{
    let leads = service.list_for_property(&manager, &PropertyId(property_id))?;
    Ok(Json(leads).into_response())
}

pub(crate) async fn import_handler<R>(
    State(service): State<Arc<LeadService<R>>>,
    ActingUser(manager): ActingUser,
    Path(property_id): Path<String>,
    Json(request): Json<LeadImportRequest>,
) -> Result<Response, LeadServiceError>
where
    R: LeadRepository + 'static,
{
    let summary = service.import_csv(&manager, &PropertyId(property_id), &request.csv)?;
    Ok(Json(summary).into_response())
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<LeadService<R>>>,
    ActingUser(manager): ActingUser,
    Path(lead_id): Path<String>,
) -> Result<Response, LeadServiceError>
where
    R: LeadRepository + 'static,
{
    let lead = service.get(&manager, &LeadId(lead_id))?;
    Ok(Json(lead).into_response())
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<LeadService<R>>>,
    ActingUser(manager): ActingUser,
    Path(lead_id): Path<String>,
    Json(request): Json<LeadStatusRequest>,
) -> Result<Response, LeadServiceError>
where
    R: LeadRepository + 'static,
{
    let lead = service.advance(&manager, &LeadId(lead_id), request.status)?;
    Ok(Json(lead).into_response())
}

impl IntoResponse for LeadServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            LeadServiceError::NotFound | LeadServiceError::PropertyNotFound => {
                StatusCode::NOT_FOUND
            }
            LeadServiceError::Forbidden => StatusCode::FORBIDDEN,
            LeadServiceError::InvalidLead(_) | LeadServiceError::Import(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            LeadServiceError::Duplicate(_)
            | LeadServiceError::Backward { .. }
            | LeadServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            LeadServiceError::Repository(err) => {
                error!(error = %err, "lead repository failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

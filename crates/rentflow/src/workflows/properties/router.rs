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

use super::domain::{PropertyDetails, PropertyId, PropertyStatus};
use super::repository::PropertyRepository;
use super::service::{PropertyService, PropertyServiceError};

#[derive(Debug, Deserialize)]
pub struct PropertyStatusRequest {
    pub status: PropertyStatus,
}

/// Router exposing listing CRUD for managers.
pub fn property_router<R>(service: Arc<PropertyService<R>>) -> Router
where
    R: PropertyRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/v1/properties/:property_id",
            get(get_handler::<R>).put(update_handler::<R>),
        )
        .route(
            "/api/v1/properties/:property_id/status",
            post(status_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<PropertyService<R>>>,
    ActingUser(manager): ActingUser,
    Json(details): Json<PropertyDetails>,
) -> Result<Response, PropertyServiceError>
where
    R: PropertyRepository + 'static,
{
    let property = service.create(&manager, details)?;
    Ok((StatusCode::CREATED, Json(property)).into_response())
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<PropertyService<R>>>,
    ActingUser(manager): ActingUser,
) -> Result<Response, PropertyServiceError>
where
    R: PropertyRepository + 'static,
{
    let properties = service.list_for_manager(&manager)?;
    Ok(Json(properties).into_response())
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<PropertyService<R>>>,
    ActingUser(manager): ActingUser,
    Path(property_id): Path<String>,
) -> Result<Response, PropertyServiceError>
where
    R: PropertyRepository + 'static,
{
    let property = service.get(&manager, &PropertyId(property_id))?;
    Ok(Json(property).into_response())
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<PropertyService<R>>>,
    ActingUser(manager): ActingUser,
    Path(property_id): Path<String>,
    Json(details): Json<PropertyDetails>,
) -> Result<Response, PropertyServiceError>
where
    R: PropertyRepository + 'static,
{
    let property = service.update(&manager, &PropertyId(property_id), details)?;
    Ok(Json(property).into_response())
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<PropertyService<R>>>,
    ActingUser(manager): ActingUser,
    Path(property_id): Path<String>,
    Json(request): Json<PropertyStatusRequest>,
) -> Result<Response, PropertyServiceError>
where
    R: PropertyRepository + 'static,
{
    let property = service.set_status(&manager, &PropertyId(property_id), request.status)?;
    Ok(Json(property).into_response())
}

impl IntoResponse for PropertyServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            PropertyServiceError::NotFound => StatusCode::NOT_FOUND,
            PropertyServiceError::Forbidden => StatusCode::FORBIDDEN,
            PropertyServiceError::InvalidDetails(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PropertyServiceError::Repository(err) => {
                error!(error = %err, "property repository failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

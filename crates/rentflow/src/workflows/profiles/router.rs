use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::error;

use crate::actor::ActingUser;

use super::domain::ProfileFields;
use super::repository::ProfileRepository;
use super::service::{ProfileService, ProfileServiceError};

pub fn profile_router<R>(service: Arc<ProfileService<R>>) -> Router
where
    R: ProfileRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/profile",
            get(get_handler::<R>).put(upsert_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<ProfileService<R>>>,
    ActingUser(tenant): ActingUser,
) -> Result<Response, ProfileServiceError>
where
    R: ProfileRepository + 'static,
{
    let profile = service.get_for_user(&tenant)?;
    Ok(Json(profile).into_response())
}

pub(crate) async fn upsert_handler<R>(
    State(service): State<Arc<ProfileService<R>>>,
    ActingUser(tenant): ActingUser,
    Json(update): Json<ProfileFields>,
) -> Result<Response, ProfileServiceError>
where
    R: ProfileRepository + 'static,
{
    let profile = service.upsert_for_user(&tenant, update)?;
    Ok(Json(profile).into_response())
}

impl IntoResponse for ProfileServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProfileServiceError::NotFound => StatusCode::NOT_FOUND,
            ProfileServiceError::Repository(err) => {
                error!(error = %err, "profile repository failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

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

use super::domain::ConversationId;
use super::repository::ConversationRepository;
use super::service::{MessagingError, MessagingService, StartConversation};

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub body: String,
}

pub fn messaging_router<R>(service: Arc<MessagingService<R>>) -> Router
where
    R: ConversationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/conversations",
            post(start_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/v1/conversations/:conversation_id/messages",
            get(messages_handler::<R>).post(post_handler::<R>),
        )
        .with_state(service)
}

async fn start_handler<R>(
    State(service): State<Arc<MessagingService<R>>>,
    ActingUser(manager): ActingUser,
    Json(request): Json<StartConversation>,
) -> Result<Response, MessagingError>
where
    R: ConversationRepository + 'static,
{
    let conversation = service.start_conversation(&manager, request)?;
    Ok((StatusCode::CREATED, Json(conversation)).into_response())
}

async fn list_handler<R>(
    State(service): State<Arc<MessagingService<R>>>,
    ActingUser(user): ActingUser,
) -> Result<Response, MessagingError>
where
    R: ConversationRepository + 'static,
{
    let conversations = service.list_for_participant(&user)?;
    Ok(Json(conversations).into_response())
}

async fn messages_handler<R>(
    State(service): State<Arc<MessagingService<R>>>,
    ActingUser(user): ActingUser,
    Path(conversation_id): Path<String>,
) -> Result<Response, MessagingError>
where
    R: ConversationRepository + 'static,
{
    let messages = service.messages(&user, &ConversationId(conversation_id))?;
    Ok(Json(messages).into_response())
}

async fn post_handler<R>(
    State(service): State<Arc<MessagingService<R>>>,
    ActingUser(user): ActingUser,
    Path(conversation_id): Path<String>,
    Json(request): Json<PostMessageRequest>,
) -> Result<Response, MessagingError>
where
    R: ConversationRepository + 'static,
{
    let message = service.post_message(&user, &ConversationId(conversation_id), &request.body)?;
    Ok((StatusCode::CREATED, Json(message)).into_response())
}

impl IntoResponse for MessagingError {
    fn into_response(self) -> Response {
        let status = match &self {
            MessagingError::NotFound | MessagingError::PropertyNotFound => StatusCode::NOT_FOUND,
            MessagingError::Forbidden => StatusCode::FORBIDDEN,
            MessagingError::InvalidCounterpart(_)
            | MessagingError::EmptyBody
            | MessagingError::BodyTooLong(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MessagingError::Repository(err) => {
                error!(error = %err, "conversation repository failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

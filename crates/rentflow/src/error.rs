use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::applications::ApplicationServiceError;
use crate::workflows::leads::LeadServiceError;
use crate::workflows::messaging::MessagingError;
use crate::workflows::profiles::ProfileServiceError;
use crate::workflows::properties::PropertyServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Process-level error: bootstrap failures plus any workflow error surfaced by a command.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Property(PropertyServiceError),
    Profile(ProfileServiceError),
    Application(ApplicationServiceError),
    Lead(LeadServiceError),
    Messaging(MessagingError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Property(err) => write!(f, "property workflow error: {}", err),
            AppError::Profile(err) => write!(f, "profile workflow error: {}", err),
            AppError::Application(err) => write!(f, "application workflow error: {}", err),
            AppError::Lead(err) => write!(f, "lead workflow error: {}", err),
            AppError::Messaging(err) => write!(f, "messaging error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Property(err) => Some(err),
            AppError::Profile(err) => Some(err),
            AppError::Application(err) => Some(err),
            AppError::Lead(err) => Some(err),
            AppError::Messaging(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Property(err) => err.into_response(),
            AppError::Profile(err) => err.into_response(),
            AppError::Application(err) => err.into_response(),
            AppError::Lead(err) => err.into_response(),
            AppError::Messaging(err) => err.into_response(),
            other => {
                let body = Json(json!({ "error": other.to_string() }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<PropertyServiceError> for AppError {
    fn from(value: PropertyServiceError) -> Self {
        Self::Property(value)
    }
}

impl From<ProfileServiceError> for AppError {
    fn from(value: ProfileServiceError) -> Self {
        Self::Profile(value)
    }
}

impl From<ApplicationServiceError> for AppError {
    fn from(value: ApplicationServiceError) -> Self {
        Self::Application(value)
    }
}

impl From<LeadServiceError> for AppError {
    fn from(value: LeadServiceError) -> Self {
        Self::Lead(value)
    }
}

impl From<MessagingError> for AppError {
    fn from(value: MessagingError) -> Self {
        Self::Messaging(value)
    }
}

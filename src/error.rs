use std::time::Duration;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use reqwest::StatusCode as UpstreamStatus;
use thiserror::Error;

use crate::web::models::ErrorResponse;

pub const MISSING_MESSAGE: &str = "Falta el campo 'message'.";
pub const PAYLOAD_TOO_LARGE: &str = "El cuerpo de la petición es demasiado grande.";
pub const SERVER_ERROR: &str = "Ocurrió un error en el servidor.";

/// Startup failures. Any of these stops the process before it binds.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown persona {0:?} (expected strict, balanced or relaxed)")]
    UnknownPersona(String),

    #[error("failed to read persona template {path}: {source}")]
    PersonaFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render persona template: {0}")]
    PersonaTemplate(#[from] tera::Error),
}

/// Failures of the outbound completion call.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("request to completion provider failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("completion provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("completion provider returned {status}: {message}")]
    Status {
        status: UpstreamStatus,
        message: String,
    },

    #[error("completion provider sent an undecodable body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Per-request failures surfaced by the chat endpoint. `Display` carries the
/// full detail for logs; the response body only ever carries `public_message`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request has no usable 'message' field")]
    MissingMessage,

    #[error("request body exceeds the JSON limit")]
    PayloadTooLarge,

    #[error(transparent)]
    Upstream(#[from] CompletionError),
}

impl ApiError {
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::MissingMessage => MISSING_MESSAGE,
            ApiError::PayloadTooLarge => PAYLOAD_TOO_LARGE,
            ApiError::Upstream(_) => SERVER_ERROR,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingMessage => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.public_message().to_string(),
        })
    }
}

//! Bridge error types with HTTP status code mapping.
//!
//! [`BridgeError`] is the unified error type for the server. Request-level
//! variants implement `axum::response::IntoResponse` and produce a
//! `text/plain` body, matching the text-out protocol of the bridge.
//! Startup variants ([`BridgeError::BindFailure`], [`BridgeError::Config`])
//! are fatal for the binary.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::ConfigError;
use crate::evaluator::EvalError;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Body is not JSON, not an object, or lacks a string `to_eval` (400).
    #[error("malformed request body: {0}")]
    MalformedRequestBody(String),

    /// Body exceeded the configured size limit (413).
    #[error("request body too large: {0}")]
    PayloadTooLarge(String),

    /// Evaluator reported an error or dropped the request (500).
    #[error("evaluator failure: {0}")]
    EvaluatorFailure(String),

    /// Evaluator did not call back in time (504).
    #[error("evaluator did not respond within {0:?}")]
    EvaluatorTimeout(Duration),

    /// Listener could not bind at startup.
    #[error("failed to bind {addr}: {source}")]
    BindFailure {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// HTTP status for this error when it ends a request.
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::MalformedRequestBody(_) => StatusCode::BAD_REQUEST,
            BridgeError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            BridgeError::EvaluatorFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BridgeError::EvaluatorTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            BridgeError::BindFailure { .. } | BridgeError::Config(_) | BridgeError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            // The evaluator's own error text is the body, unprefixed.
            BridgeError::EvaluatorFailure(message) => message,
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}

impl From<EvalError> for BridgeError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::Failed(message) => BridgeError::EvaluatorFailure(message),
            EvalError::Dropped => BridgeError::EvaluatorFailure(err.to_string()),
        }
    }
}

impl From<BytesRejection> for BridgeError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            BridgeError::PayloadTooLarge(rejection.body_text())
        } else {
            BridgeError::MalformedRequestBody(rejection.body_text())
        }
    }
}

//! Error types for the Notion API client.
//!
//! # Design
//! Status codes the API documents as client mistakes get dedicated variants
//! carrying the decoded response body. A 500 carries nothing. Any other status
//! at or above 400 lands in `UnexpectedStatus` with the raw code and body.

use crate::types::Payload;

/// Errors returned by `NotionClient` operations and `parse`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP 400: the request body or query was rejected.
    #[error("malformed input: {0}")]
    MalformedInput(Payload),

    /// HTTP 401: missing or invalid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(Payload),

    /// HTTP 406.
    #[error("limit exceeded: {0}")]
    LimitExceeded(Payload),

    /// HTTP 500.
    #[error("internal server error")]
    Internal,

    /// Any other status at or above 400.
    #[error("unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: Payload },

    /// An OAuth call needed a credential the configuration does not hold.
    #[error("missing client credential: {0}")]
    MissingCredentials(&'static str),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// The decoded response body attached to this error, if any.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            ApiError::MalformedInput(body)
            | ApiError::Unauthorized(body)
            | ApiError::LimitExceeded(body)
            | ApiError::UnexpectedStatus { body, .. } => Some(body),
            _ => None,
        }
    }
}

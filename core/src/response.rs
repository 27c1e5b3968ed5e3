//! Response classification.
//!
//! # Design
//! The status code is looked up in a closed table (`StatusClass`) before the
//! body is turned into a success value or an `ApiError`. Codes the API does not
//! document fall into two defaults: below 400 the body is returned as a success,
//! from 400 up the call fails with `ApiError::UnexpectedStatus`.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::types::Payload;

/// Outcome category for an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200: return the body.
    Ok,
    /// 204: return no value.
    NoContent,
    /// 400
    MalformedInput,
    /// 401
    Unauthorized,
    /// 406
    LimitExceeded,
    /// 500: fail without a payload.
    Internal,
    /// Any other code below 400: return the body.
    PassThrough,
    /// Any other code from 400 up.
    Unexpected,
}

impl StatusClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => StatusClass::Ok,
            204 => StatusClass::NoContent,
            400 => StatusClass::MalformedInput,
            401 => StatusClass::Unauthorized,
            406 => StatusClass::LimitExceeded,
            500 => StatusClass::Internal,
            0..=399 => StatusClass::PassThrough,
            _ => StatusClass::Unexpected,
        }
    }
}

/// Decode the body: JSON when the `Content-Type` says so and it parses,
/// otherwise the raw text.
pub fn decode_body(response: &HttpResponse) -> Payload {
    if response.is_json() {
        if let Ok(value) = serde_json::from_str(&response.body) {
            return Payload::Json(value);
        }
    }
    Payload::Text(response.body.clone())
}

/// Classify a response into a success value or a typed error.
///
/// `Ok(None)` is the empty value returned for 204.
pub fn parse(response: &HttpResponse) -> Result<Option<Payload>, ApiError> {
    let body = decode_body(response);
    let class = StatusClass::from_status(response.status);
    debug!(status = response.status, ?class, "classified response");

    match class {
        StatusClass::Ok | StatusClass::PassThrough => Ok(Some(body)),
        StatusClass::NoContent => Ok(None),
        StatusClass::MalformedInput => {
            warn!(%body, "request rejected as malformed");
            Err(ApiError::MalformedInput(body))
        }
        StatusClass::Unauthorized => {
            warn!(%body, "request unauthorized");
            Err(ApiError::Unauthorized(body))
        }
        StatusClass::LimitExceeded => {
            warn!(%body, "limit exceeded");
            Err(ApiError::LimitExceeded(body))
        }
        StatusClass::Internal => {
            warn!("server returned 500");
            Err(ApiError::Internal)
        }
        StatusClass::Unexpected => {
            warn!(status = response.status, %body, "unexpected status");
            Err(ApiError::UnexpectedStatus {
                status: response.status,
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    fn text_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: body.to_string(),
        }
    }

    #[test]
    fn status_table() {
        assert_eq!(StatusClass::from_status(200), StatusClass::Ok);
        assert_eq!(StatusClass::from_status(204), StatusClass::NoContent);
        assert_eq!(StatusClass::from_status(400), StatusClass::MalformedInput);
        assert_eq!(StatusClass::from_status(401), StatusClass::Unauthorized);
        assert_eq!(StatusClass::from_status(406), StatusClass::LimitExceeded);
        assert_eq!(StatusClass::from_status(500), StatusClass::Internal);
        assert_eq!(StatusClass::from_status(201), StatusClass::PassThrough);
        assert_eq!(StatusClass::from_status(302), StatusClass::PassThrough);
        assert_eq!(StatusClass::from_status(404), StatusClass::Unexpected);
        assert_eq!(StatusClass::from_status(429), StatusClass::Unexpected);
        assert_eq!(StatusClass::from_status(503), StatusClass::Unexpected);
    }

    #[test]
    fn ok_returns_decoded_json() {
        let result = parse(&json_response(200, r#"{"object":"user"}"#)).unwrap();
        assert_eq!(result, Some(Payload::Json(json!({"object": "user"}))));
    }

    #[test]
    fn ok_with_text_content_type_returns_text() {
        let result = parse(&text_response(200, r#"{"object":"user"}"#)).unwrap();
        assert_eq!(result, Some(Payload::Text(r#"{"object":"user"}"#.to_string())));
    }

    #[test]
    fn invalid_json_falls_back_to_text() {
        let result = parse(&json_response(200, "not json")).unwrap();
        assert_eq!(result, Some(Payload::Text("not json".to_string())));
    }

    #[test]
    fn no_content_returns_none() {
        let response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert_eq!(parse(&response).unwrap(), None);
    }

    #[test]
    fn bad_request_carries_body() {
        let err = parse(&json_response(400, r#"{"message":"bad"}"#)).unwrap_err();
        match err {
            ApiError::MalformedInput(body) => {
                assert_eq!(body, Payload::Json(json!({"message": "bad"})));
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn unauthorized_carries_body() {
        let err = parse(&json_response(401, r#"{"code":"unauthorized"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(Payload::Json(_))));
    }

    #[test]
    fn not_acceptable_is_limit_exceeded() {
        let err = parse(&text_response(406, "too many")).unwrap_err();
        match err {
            ApiError::LimitExceeded(body) => assert_eq!(body, Payload::Text("too many".to_string())),
            other => panic!("expected LimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn server_error_has_no_payload() {
        let err = parse(&json_response(500, r#"{"message":"boom"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Internal));
        assert!(err.payload().is_none());
    }

    #[test]
    fn undocumented_success_code_passes_body_through() {
        let result = parse(&json_response(202, r#"{"queued":true}"#)).unwrap();
        assert_eq!(result, Some(Payload::Json(json!({"queued": true}))));
    }

    #[test]
    fn undocumented_error_code_is_unexpected_status() {
        let err = parse(&json_response(404, r#"{"code":"object_not_found"}"#)).unwrap_err();
        match err {
            ApiError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, Payload::Json(json!({"code": "object_not_found"})));
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }
}

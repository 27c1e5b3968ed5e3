//! OAuth helpers: the authorization URL and Basic client credentials.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Path of the authorization page, relative to the API base URL.
pub const AUTHORIZE_ENDPOINT: &str = "oauth/authorize";
pub const TOKEN_ENDPOINT: &str = "oauth/token";

/// The URL a user visits to grant the integration access.
///
/// Query parameters are `client_id`, `redirect_uri`, `response_type=code`,
/// `owner=user`, and `state` when one is given.
pub fn authorization_url(config: &ClientConfig, state: Option<&str>) -> Result<String, ApiError> {
    let client_id = config
        .client_id
        .as_deref()
        .ok_or(ApiError::MissingCredentials("client_id"))?;
    let redirect_uri = config
        .redirect_uri
        .as_deref()
        .ok_or(ApiError::MissingCredentials("redirect_uri"))?;

    let mut params = vec![
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("response_type", "code"),
        ("owner", "user"),
    ];
    if let Some(state) = state.filter(|s| !s.is_empty()) {
        params.push(("state", state));
    }

    let url = Url::parse_with_params(&config.endpoint_url(AUTHORIZE_ENDPOINT), &params)
        .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
    Ok(url.into())
}

/// `base64(client_id:client_secret)`, the value after `Basic `.
pub fn basic_credentials(config: &ClientConfig) -> Result<String, ApiError> {
    let client_id = config
        .client_id
        .as_deref()
        .ok_or(ApiError::MissingCredentials("client_id"))?;
    let client_secret = config
        .client_secret
        .as_deref()
        .ok_or(ApiError::MissingCredentials("client_secret"))?;
    Ok(STANDARD.encode(format!("{client_id}:{client_secret}")))
}

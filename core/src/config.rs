//! Client configuration.

use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1/";
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

/// Credentials and endpoint settings for a `NotionClient`.
///
/// Either supply an integration token directly (`access_token`) or the OAuth
/// client credentials needed to exchange an authorization code for one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_version: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub access_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            access_token: None,
        }
    }
}

impl ClientConfig {
    /// Configuration for an internal integration token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::default().access_token(token)
    }

    /// Configuration for a public OAuth integration.
    pub fn oauth(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            redirect_uri: Some(redirect_uri.into()),
            ..Self::default()
        }
    }

    /// Build a configuration from `NOTION_*` environment variables, falling
    /// back to the defaults for anything unset or empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let defaults = Self::default();
        Self {
            base_url: get("NOTION_BASE_URL").unwrap_or(defaults.base_url),
            api_version: get("NOTION_VERSION").unwrap_or(defaults.api_version),
            client_id: get("NOTION_CLIENT_ID"),
            client_secret: get("NOTION_CLIENT_SECRET"),
            redirect_uri: get("NOTION_REDIRECT_URI"),
            access_token: get("NOTION_TOKEN"),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// `base_url` joined with `endpoint`, with exactly one slash between them.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

//! Blocking client for the Notion REST API.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` as plain data and a method of the same name without the
//! prefix that sends it through the client's `Transport` and classifies the
//! response with `parse`. Base headers are fixed when the client is built and
//! only change through `set_token`; per-call headers are passed explicitly in
//! `RequestOptions` and never leak into later calls.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{merge_headers, HttpMethod, HttpRequest, HttpResponse};
use crate::response;
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    Cover, CreatePage, DatabaseParent, DatabaseQuery, ObjectType, Pagination, Payload,
    SearchRequest, TokenRequest, TokenResponse, UpdatePage, MAX_PAGE_SIZE,
};

/// Body, query, and header overrides for a single generic request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Client for the Notion API.
#[derive(Debug, Clone)]
pub struct NotionClient<T = UreqTransport> {
    config: ClientConfig,
    headers: Vec<(String, String)>,
    transport: T,
}

impl NotionClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> NotionClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            ("Notion-Version".to_string(), config.api_version.clone()),
        ];
        if let Some(token) = &config.access_token {
            headers.push(bearer(token));
        }
        Self {
            config,
            headers,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Authenticate every subsequent request with `Authorization: Bearer <token>`.
    pub fn set_token(&mut self, access_token: &str) {
        self.config.access_token = Some(access_token.to_string());
        self.headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
        self.headers.push(bearer(access_token));
    }

    // --- OAuth -----------------------------------------------------------

    pub fn authorization_url(&self, state: Option<&str>) -> Result<String, ApiError> {
        auth::authorization_url(&self.config, state)
    }

    pub fn build_access_token(&self, code: &str) -> Result<HttpRequest, ApiError> {
        let credentials = auth::basic_credentials(&self.config)?;
        let body = TokenRequest::authorization_code(code, self.config.redirect_uri.clone());
        let options = RequestOptions::new()
            .json(&body)?
            .header("Authorization", format!("Basic {credentials}"));
        self.build_request(HttpMethod::Post, auth::TOKEN_ENDPOINT, options)
    }

    /// Exchange an authorization code for an access token. The token is not
    /// stored; see `authorize` for that.
    pub fn get_access_token(&self, code: &str) -> Result<Option<Payload>, ApiError> {
        self.send(&self.build_access_token(code)?)
    }

    /// Exchange an authorization code and use the returned token from now on.
    pub fn authorize(&mut self, code: &str) -> Result<TokenResponse, ApiError> {
        let payload = self.get_access_token(code)?;
        let token: TokenResponse = decode(payload)?;
        self.set_token(&token.access_token);
        Ok(token)
    }

    // --- Users -----------------------------------------------------------

    pub fn build_get_current_user(&self) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Get, "users/me", RequestOptions::new())
    }

    pub fn get_current_user(&self) -> Result<Option<Payload>, ApiError> {
        self.send(&self.build_get_current_user()?)
    }

    pub fn build_list_users(&self, pagination: &Pagination) -> Result<HttpRequest, ApiError> {
        check_page_size(pagination.page_size);
        let options = RequestOptions::new().query(pagination.to_query());
        self.build_request(HttpMethod::Get, "users", options)
    }

    pub fn list_users(&self, pagination: &Pagination) -> Result<Option<Payload>, ApiError> {
        self.send(&self.build_list_users(pagination)?)
    }

    // --- Search ----------------------------------------------------------

    pub fn build_list_objects(
        &self,
        object_type: ObjectType,
        pagination: &Pagination,
    ) -> Result<HttpRequest, ApiError> {
        check_page_size(pagination.page_size);
        let body = SearchRequest::objects(object_type, pagination.clone());
        self.build_request(HttpMethod::Post, "search", RequestOptions::new().json(&body)?)
    }

    /// Top-level pages or databases shared with the integration.
    pub fn list_objects(
        &self,
        object_type: ObjectType,
        pagination: &Pagination,
    ) -> Result<Option<Payload>, ApiError> {
        self.send(&self.build_list_objects(object_type, pagination)?)
    }

    // --- Databases -------------------------------------------------------

    pub fn build_get_database(&self, database_id: &str) -> Result<HttpRequest, ApiError> {
        self.build_request(
            HttpMethod::Get,
            &format!("databases/{database_id}"),
            RequestOptions::new(),
        )
    }

    pub fn get_database(&self, database_id: &str) -> Result<Option<Payload>, ApiError> {
        self.send(&self.build_get_database(database_id)?)
    }

    pub fn build_query_database_pages(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> Result<HttpRequest, ApiError> {
        check_page_size(query.page_size);
        self.build_request(
            HttpMethod::Post,
            &format!("databases/{database_id}/query"),
            RequestOptions::new().json(query)?,
        )
    }

    pub fn query_database_pages(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> Result<Option<Payload>, ApiError> {
        self.send(&self.build_query_database_pages(database_id, query)?)
    }

    // --- Pages -----------------------------------------------------------

    pub fn build_create_page(
        &self,
        database_id: &str,
        properties: Value,
        cover_url: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = CreatePage {
            parent: DatabaseParent {
                database_id: database_id.to_string(),
            },
            properties,
            cover: cover_url.map(Cover::external),
        };
        self.build_request(HttpMethod::Post, "pages", RequestOptions::new().json(&body)?)
    }

    /// Create a page inside a database. `properties` must match the
    /// database schema.
    pub fn create_page(
        &self,
        database_id: &str,
        properties: Value,
        cover_url: Option<&str>,
    ) -> Result<Option<Payload>, ApiError> {
        self.send(&self.build_create_page(database_id, properties, cover_url)?)
    }

    pub fn build_update_page(
        &self,
        page_id: &str,
        properties: Value,
        cover_url: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = UpdatePage {
            properties,
            cover: cover_url.map(Cover::external),
        };
        self.build_request(
            HttpMethod::Patch,
            &format!("pages/{page_id}"),
            RequestOptions::new().json(&body)?,
        )
    }

    pub fn update_page(
        &self,
        page_id: &str,
        properties: Value,
        cover_url: Option<&str>,
    ) -> Result<Option<Payload>, ApiError> {
        self.send(&self.build_update_page(page_id, properties, cover_url)?)
    }

    // --- Generic dispatch ------------------------------------------------

    /// Describe a request to `base_url + endpoint`. Header overrides in
    /// `options` apply to this request only.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let body = options
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url: self.config.endpoint_url(endpoint),
            headers: merge_headers(&self.headers, &options.headers),
            query: options.query,
            body,
        })
    }

    pub fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<Payload>, ApiError> {
        self.send(&self.build_request(method, endpoint, options)?)
    }

    pub fn get(&self, endpoint: &str, options: RequestOptions) -> Result<Option<Payload>, ApiError> {
        self.request(HttpMethod::Get, endpoint, options)
    }

    pub fn post(&self, endpoint: &str, options: RequestOptions) -> Result<Option<Payload>, ApiError> {
        self.request(HttpMethod::Post, endpoint, options)
    }

    pub fn put(&self, endpoint: &str, options: RequestOptions) -> Result<Option<Payload>, ApiError> {
        self.request(HttpMethod::Put, endpoint, options)
    }

    pub fn patch(&self, endpoint: &str, options: RequestOptions) -> Result<Option<Payload>, ApiError> {
        self.request(HttpMethod::Patch, endpoint, options)
    }

    pub fn delete(&self, endpoint: &str, options: RequestOptions) -> Result<Option<Payload>, ApiError> {
        self.request(HttpMethod::Delete, endpoint, options)
    }

    /// Execute a prepared request and classify the response.
    pub fn send(&self, request: &HttpRequest) -> Result<Option<Payload>, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "received response");
        Self::parse(&response)
    }

    /// See `response::parse`.
    pub fn parse(response: &HttpResponse) -> Result<Option<Payload>, ApiError> {
        response::parse(response)
    }
}

fn bearer(token: &str) -> (String, String) {
    ("Authorization".to_string(), format!("Bearer {token}"))
}

fn check_page_size(page_size: Option<u32>) {
    if let Some(size) = page_size.filter(|size| *size > MAX_PAGE_SIZE) {
        warn!(page_size = size, max = MAX_PAGE_SIZE, "page_size above the API maximum");
    }
}

/// Decode a JSON payload into a typed response.
fn decode<R: serde::de::DeserializeOwned>(payload: Option<Payload>) -> Result<R, ApiError> {
    match payload {
        Some(Payload::Json(value)) => {
            serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
        }
        Some(Payload::Text(text)) => Err(ApiError::DeserializationError(format!(
            "expected a JSON body, got: {text}"
        ))),
        None => Err(ApiError::DeserializationError("empty response body".to_string())),
    }
}

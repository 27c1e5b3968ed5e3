//! In-memory imitation of the Notion endpoints the client calls.
//!
//! Errors use Notion's error object shape:
//! `{"object":"error","status":..,"code":..,"message":..}`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const MAX_PAGE_SIZE: usize = 100;
const DEFAULT_PAGE_SIZE: usize = 100;

/// Credentials and fixture ids the server accepts.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub token: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_code: String,
    pub database_id: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            token: "secret_mock_token".to_string(),
            client_id: "mock-client".to_string(),
            client_secret: "mock-secret".to_string(),
            auth_code: "mock-code".to_string(),
            database_id: "d9824bdc-8445-4327-be8b-5b47500af6ce".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Store {
    pub users: Vec<Value>,
    pub databases: HashMap<String, Value>,
    pub pages: Vec<Value>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MockConfig>,
    pub store: Arc<RwLock<Store>>,
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn notion_error(status: StatusCode, code: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "object": "error",
            "status": status.as_u16(),
            "code": code,
            "message": message,
        })),
    )
}

fn bot_user() -> Value {
    json!({
        "object": "user",
        "id": "9188c6a5-7381-452f-b3dc-d4865aa89bdf",
        "type": "bot",
        "name": "Mock Integration",
        "bot": {"owner": {"type": "workspace", "workspace": true}},
    })
}

fn seed(config: &MockConfig) -> Store {
    let mut users = vec![bot_user()];
    for (i, name) in ["Ada", "Grace", "Linus"].iter().enumerate() {
        users.push(json!({
            "object": "user",
            "id": format!("00000000-0000-0000-0000-00000000000{}", i + 1),
            "type": "person",
            "name": name,
            "person": {"email": format!("{}@example.com", name.to_lowercase())},
        }));
    }

    let database = json!({
        "object": "database",
        "id": config.database_id,
        "title": [{"type": "text", "plain_text": "Tasks"}],
        "properties": {
            "Name": {"id": "title", "type": "title", "title": {}},
            "Done": {"id": "done", "type": "checkbox", "checkbox": {}},
        },
    });

    Store {
        users,
        databases: HashMap::from([(config.database_id.clone(), database)]),
        pages: Vec::new(),
    }
}

pub fn app() -> Router {
    app_with_config(MockConfig::default())
}

pub fn app_with_config(config: MockConfig) -> Router {
    let store = Arc::new(RwLock::new(seed(&config)));
    let state = AppState {
        config: Arc::new(config),
        store,
    };
    Router::new()
        .route("/v1/oauth/token", post(exchange_token))
        .route("/v1/users/me", get(current_user))
        .route("/v1/users", get(list_users))
        .route("/v1/search", post(search))
        .route("/v1/databases/{id}", get(get_database))
        .route("/v1/databases/{id}/query", post(query_database))
        .route("/v1/pages", post(create_page))
        .route("/v1/pages/{id}", patch(update_page))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_config(listener, MockConfig::default()).await
}

pub async fn run_with_config(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_config(config)).await
}

fn header_value<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Header checks shared by every bearer-authenticated endpoint.
fn check_request(headers: &HeaderMap, config: &MockConfig) -> Result<(), (StatusCode, Json<Value>)> {
    if let Some(accept) = header_value(headers, header::ACCEPT) {
        if !accept.contains("application/json") && !accept.contains("*/*") {
            return Err(notion_error(
                StatusCode::NOT_ACCEPTABLE,
                "not_acceptable",
                "Accept header must allow application/json.",
            ));
        }
    }
    let expected = format!("Bearer {}", config.token);
    if header_value(headers, header::AUTHORIZATION) != Some(expected.as_str()) {
        return Err(notion_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "API token is invalid.",
        ));
    }
    if headers.get("notion-version").is_none() {
        return Err(notion_error(
            StatusCode::BAD_REQUEST,
            "missing_version",
            "Notion-Version header failed validation.",
        ));
    }
    Ok(())
}

/// Slice `items` starting at the index encoded in `start_cursor`.
fn paginate(
    items: &[Value],
    start_cursor: Option<&str>,
    page_size: Option<usize>,
) -> Result<Value, (StatusCode, Json<Value>)> {
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(notion_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "body.page_size should be between 1 and 100.",
        ));
    }
    let start = match start_cursor {
        None => 0,
        Some(cursor) => cursor.parse::<usize>().map_err(|_| {
            notion_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "start_cursor should be a valid cursor.",
            )
        })?,
    };
    let start = start.min(items.len());
    let end = (start + page_size).min(items.len());
    let has_more = end < items.len();
    let next_cursor = has_more.then(|| end.to_string());
    Ok(json!({
        "object": "list",
        "results": items[start..end].to_vec(),
        "next_cursor": next_cursor,
        "has_more": has_more,
    }))
}

#[derive(Deserialize)]
pub struct TokenBody {
    pub grant_type: String,
    pub code: String,
    pub redirect_uri: Option<String>,
}

async fn exchange_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TokenBody>,
) -> ApiResult {
    let config = &state.config;
    let expected = format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", config.client_id, config.client_secret))
    );
    if header_value(&headers, header::AUTHORIZATION) != Some(expected.as_str()) {
        return Err(notion_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Invalid client credentials.",
        ));
    }
    if body.grant_type != "authorization_code" || body.code != config.auth_code {
        return Err(notion_error(
            StatusCode::BAD_REQUEST,
            "invalid_grant",
            "Invalid code.",
        ));
    }
    tracing::info!(redirect_uri = ?body.redirect_uri, "issued access token");
    Ok(Json(json!({
        "access_token": config.token,
        "token_type": "bearer",
        "bot_id": "9188c6a5-7381-452f-b3dc-d4865aa89bdf",
        "workspace_id": "e0b1f3a2-0000-4000-8000-000000000001",
        "workspace_name": "Mock Workspace",
        "workspace_icon": null,
        "owner": {"type": "user", "user": {"object": "user", "id": "00000000-0000-0000-0000-000000000001"}},
        "duplicated_template_id": null,
    })))
}

async fn current_user(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    check_request(&headers, &state.config)?;
    Ok(Json(bot_user()))
}

#[derive(Deserialize)]
pub struct ListParams {
    pub start_cursor: Option<String>,
    pub page_size: Option<usize>,
}

async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> ApiResult {
    check_request(&headers, &state.config)?;
    let store = state.store.read().await;
    paginate(&store.users, params.start_cursor.as_deref(), params.page_size).map(Json)
}

#[derive(Deserialize)]
pub struct SearchBody {
    pub filter: Option<SearchFilter>,
    pub start_cursor: Option<String>,
    pub page_size: Option<usize>,
}

#[derive(Deserialize)]
pub struct SearchFilter {
    pub value: String,
    pub property: String,
}

async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SearchBody>,
) -> ApiResult {
    check_request(&headers, &state.config)?;
    let store = state.store.read().await;
    let mut objects: Vec<Value> = store.databases.values().cloned().collect();
    objects.extend(store.pages.iter().cloned());

    if let Some(filter) = &body.filter {
        if filter.property != "object" || !matches!(filter.value.as_str(), "page" | "database") {
            return Err(notion_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "body.filter.value should be \"page\" or \"database\".",
            ));
        }
        objects.retain(|o| o["object"] == filter.value.as_str());
    }
    paginate(&objects, body.start_cursor.as_deref(), body.page_size).map(Json)
}

fn not_found(id: &str) -> (StatusCode, Json<Value>) {
    notion_error(
        StatusCode::NOT_FOUND,
        "object_not_found",
        &format!("Could not find object with ID: {id}."),
    )
}

async fn get_database(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    check_request(&headers, &state.config)?;
    let store = state.store.read().await;
    store.databases.get(&id).cloned().map(Json).ok_or_else(|| not_found(&id))
}

#[derive(Deserialize)]
pub struct QueryBody {
    pub filter: Option<Value>,
    pub sorts: Option<Value>,
    pub start_cursor: Option<String>,
    pub page_size: Option<usize>,
}

/// Supports the single-checkbox filter `{"property": .., "checkbox": {"equals": ..}}`;
/// any other filter matches everything.
fn matches_filter(page: &Value, filter: &Value) -> bool {
    match (filter["property"].as_str(), filter["checkbox"]["equals"].as_bool()) {
        (Some(property), Some(expected)) => {
            page["properties"][property]["checkbox"].as_bool() == Some(expected)
        }
        _ => true,
    }
}

async fn query_database(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<QueryBody>,
) -> ApiResult {
    check_request(&headers, &state.config)?;
    let store = state.store.read().await;
    if !store.databases.contains_key(&id) {
        return Err(not_found(&id));
    }
    if body.sorts.as_ref().is_some_and(|s| !s.is_array()) {
        return Err(notion_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "body.sorts should be an array.",
        ));
    }
    let pages: Vec<Value> = store
        .pages
        .iter()
        .filter(|p| p["parent"]["database_id"] == id.as_str())
        .filter(|p| body.filter.as_ref().map_or(true, |f| matches_filter(p, f)))
        .cloned()
        .collect();
    paginate(&pages, body.start_cursor.as_deref(), body.page_size).map(Json)
}

#[derive(Deserialize)]
pub struct ParentBody {
    pub database_id: String,
}

#[derive(Deserialize)]
pub struct CreatePageBody {
    pub parent: ParentBody,
    pub properties: Value,
    pub cover: Option<Value>,
}

fn require_object(properties: &Value) -> Result<&Map<String, Value>, (StatusCode, Json<Value>)> {
    properties.as_object().ok_or_else(|| {
        notion_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "body.properties should be an object.",
        )
    })
}

async fn create_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreatePageBody>,
) -> ApiResult {
    check_request(&headers, &state.config)?;
    require_object(&body.properties)?;
    let mut store = state.store.write().await;
    let database_id = body.parent.database_id;
    if !store.databases.contains_key(&database_id) {
        return Err(not_found(&database_id));
    }
    let page = json!({
        "object": "page",
        "id": Uuid::new_v4(),
        "parent": {"type": "database_id", "database_id": database_id},
        "cover": body.cover,
        "properties": body.properties,
        "archived": false,
    });
    store.pages.push(page.clone());
    Ok(Json(page))
}

#[derive(Deserialize)]
pub struct UpdatePageBody {
    pub properties: Option<Value>,
    pub cover: Option<Value>,
}

async fn update_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdatePageBody>,
) -> ApiResult {
    check_request(&headers, &state.config)?;
    let mut store = state.store.write().await;
    let page = store
        .pages
        .iter_mut()
        .find(|p| p["id"] == id.as_str())
        .ok_or_else(|| not_found(&id))?;

    if let Some(properties) = &body.properties {
        let updates = require_object(properties)?;
        if let Some(existing) = page["properties"].as_object_mut() {
            for (key, value) in updates {
                existing.insert(key.clone(), value.clone());
            }
        }
    }
    if let Some(cover) = body.cover {
        page["cover"] = cover;
    }
    Ok(Json(page.clone()))
}

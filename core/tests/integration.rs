//! End-to-end test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through `UreqTransport`, checking that request
//! building and response classification agree with the server.

use mock_server::MockConfig;
use notion_core::{
    ApiError, ClientConfig, DatabaseQuery, NotionClient, ObjectType, Pagination, Payload,
    RequestOptions,
};
use serde_json::{json, Value};

/// Start the mock server on a random port and return its API base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/v1")
}

fn json_of(result: Result<Option<Payload>, ApiError>) -> Value {
    result
        .expect("request failed")
        .expect("empty response")
        .into_json()
        .expect("non-JSON response")
}

#[test]
fn oauth_and_page_lifecycle() {
    let base_url = start_server();
    let mock = MockConfig::default();

    // Step 1: no token yet, so authenticated calls are rejected.
    let config = ClientConfig::oauth(&mock.client_id, &mock.client_secret, "http://localhost/cb")
        .base_url(&base_url);
    let mut client = NotionClient::new(config);
    let err = client.get_current_user().unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(Payload::Json(_))), "{err:?}");

    // Step 2: authorization URL points at the configured base.
    let url = client.authorization_url(Some("s1")).unwrap();
    assert!(url.starts_with(&format!("{base_url}/oauth/authorize?client_id=mock-client")));
    assert!(url.ends_with("&state=s1"));

    // Step 3: a bad code is malformed input; the right one yields a token.
    let err = client.authorize("wrong-code").unwrap_err();
    match &err {
        ApiError::MalformedInput(body) => {
            assert_eq!(body.as_json().unwrap()["code"], "invalid_grant")
        }
        other => panic!("expected MalformedInput, got {other:?}"),
    }
    let token = client.authorize(&mock.auth_code).unwrap();
    assert_eq!(token.access_token, mock.token);
    assert_eq!(token.workspace_name.as_deref(), Some("Mock Workspace"));

    // Step 4: the stored bearer token now authenticates requests.
    let me = json_of(client.get_current_user());
    assert_eq!(me["type"], "bot");

    // Step 5: list users page by page.
    let first = json_of(client.list_users(&Pagination::new().page_size(2)));
    assert_eq!(first["results"].as_array().unwrap().len(), 2);
    assert_eq!(first["has_more"], true);
    let cursor = first["next_cursor"].as_str().unwrap().to_string();
    let second = json_of(client.list_users(&Pagination::new().page_size(2).start_cursor(cursor)));
    assert_eq!(second["results"].as_array().unwrap().len(), 2);
    assert_eq!(second["has_more"], false);

    // Step 6: fetch the database; unknown ids are an unexpected status.
    let database = json_of(client.get_database(&mock.database_id));
    assert_eq!(database["object"], "database");
    let err = client.get_database("missing").unwrap_err();
    assert!(matches!(err, ApiError::UnexpectedStatus { status: 404, .. }), "{err:?}");

    // Step 7: create a page without a cover.
    let properties = json!({
        "Name": {"title": [{"text": {"content": "Integration test"}}]},
        "Done": {"checkbox": false}
    });
    let page = json_of(client.create_page(&mock.database_id, properties, None));
    assert_eq!(page["object"], "page");
    assert!(page["cover"].is_null());
    let page_id = page["id"].as_str().unwrap().to_string();

    // Step 8: update it, adding a cover.
    let updated = json_of(client.update_page(
        &page_id,
        json!({"Done": {"checkbox": true}}),
        Some("https://img.example/cover.png"),
    ));
    assert_eq!(updated["properties"]["Done"]["checkbox"], true);
    assert_eq!(updated["cover"]["external"]["url"], "https://img.example/cover.png");

    // Step 9: query the database with and without a filter.
    let done = DatabaseQuery {
        filter: Some(json!({"property": "Done", "checkbox": {"equals": true}})),
        sorts: Some(json!([{"property": "Name", "direction": "ascending"}])),
        ..DatabaseQuery::default()
    };
    let results = json_of(client.query_database_pages(&mock.database_id, &done));
    assert_eq!(results["results"].as_array().unwrap().len(), 1);

    let from_start = DatabaseQuery {
        start_cursor: Some("0".to_string()),
        ..DatabaseQuery::default()
    };
    let results = json_of(client.query_database_pages(&mock.database_id, &from_start));
    assert_eq!(results["results"][0]["id"], page_id.as_str());

    // Step 10: search top-level objects by type.
    let pages = json_of(client.list_objects(ObjectType::Page, &Pagination::new()));
    assert_eq!(pages["results"].as_array().unwrap().len(), 1);
    let databases = json_of(client.list_objects(ObjectType::Database, &Pagination::new()));
    assert_eq!(databases["results"][0]["id"], mock.database_id.as_str());

    // Step 11: oversized pages are rejected by the server.
    let err = client
        .query_database_pages(
            &mock.database_id,
            &DatabaseQuery {
                page_size: Some(101),
                ..DatabaseQuery::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::MalformedInput(_)), "{err:?}");

    // Step 12: a per-call Accept override yields 406 and does not stick.
    let err = client
        .get("users/me", RequestOptions::new().header("Accept", "text/html"))
        .unwrap_err();
    assert!(matches!(err, ApiError::LimitExceeded(_)), "{err:?}");
    let me = json_of(client.get_current_user());
    assert_eq!(me["object"], "user");
}

#[test]
fn static_token_from_config() {
    let base_url = start_server();
    let mock = MockConfig::default();

    let client = NotionClient::new(ClientConfig::with_token(&mock.token).base_url(&base_url));
    let me = json_of(client.get_current_user());
    assert_eq!(me["object"], "user");

    let wrong = NotionClient::new(ClientConfig::with_token("secret_wrong").base_url(&base_url));
    let err = wrong.get_current_user().unwrap_err();
    match err {
        ApiError::Unauthorized(body) => assert_eq!(body.as_json().unwrap()["status"], 401),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[test]
fn unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = NotionClient::new(ClientConfig::with_token("t").base_url(format!("http://{addr}/v1")));
    let err = client.get_current_user().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
}

use mock_server::MockConfig;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt::init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let mut config = MockConfig::default();
    if let Ok(token) = std::env::var("NOTION_TOKEN") {
        config.token = token;
    }
    if let Ok(client_id) = std::env::var("NOTION_CLIENT_ID") {
        config.client_id = client_id;
    }
    if let Ok(client_secret) = std::env::var("NOTION_CLIENT_SECRET") {
        config.client_secret = client_secret;
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}, base URL http://{addr}/v1");
    mock_server::run_with_config(listener, config).await
}

use std::env;
use std::sync::Arc;

use mcp_fatsecret::{FatSecretClient, FatSecretConfig, FatSecretMcpServer};
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = FatSecretConfig::from_env()?;
    let token_url = config.token_url.clone();
    let client_id = config.client_id.clone();

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string());

    let client = Arc::new(FatSecretClient::new(config)?);

    // Validate credentials before accepting sessions
    tracing::info!("Validating FatSecret credentials...");
    if let Err(e) = client.ensure_token().await {
        tracing::error!("Authentication failed: {}", e);
        tracing::error!("Please verify:");
        tracing::error!("  - FATSECRET_CLIENT_ID is correct: {}", client_id);
        tracing::error!("  - FATSECRET_CLIENT_SECRET is correct");
        tracing::error!("  - The token endpoint is reachable: {}", token_url);
        tracing::error!("  - Your server IP is whitelisted in the FatSecret developer console");
        std::process::exit(1);
    }

    tracing::info!("Successfully authenticated with FatSecret");

    let config = SseServerConfig {
        bind: bind_addr.parse()?,
        sse_path: "/sse".to_string(),
        post_path: "/message".to_string(),
        ct: tokio_util::sync::CancellationToken::new(),
        sse_keep_alive: None,
    };

    tracing::info!("FatSecret MCP Server listening on {}", config.bind);

    let sse_server = SseServer::serve_with_config(config).await?;

    // Every session shares the same client and therefore the same token cache
    let ct = sse_server.with_service(move || FatSecretMcpServer::new(client.clone()));

    tracing::info!("FatSecret MCP Server started successfully");

    // Wait for Ctrl+C
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    ct.cancel();

    Ok(())
}

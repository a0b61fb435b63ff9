use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Json};
use clap::Parser;
use switchboard::agents::AgentManager;
use switchboard::providers::ollama::{OLLAMA_DEFAULT_MODEL, OLLAMA_HOST};
use switchboard::providers::OllamaProvider;
use switchboard::tools::builtin::BuiltinTools;
use switchboard_server::{openapi, routes, state};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

#[derive(Parser)]
#[command(
    name = "switchboardd",
    about = "Agent routing and tool orchestration server"
)]
struct Cli {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Base URL of the Ollama backend
    #[arg(long, default_value = OLLAMA_HOST)]
    ollama_url: String,

    /// Default model for analysis and synthesis
    #[arg(long, default_value = OLLAMA_DEFAULT_MODEL)]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let provider = Arc::new(OllamaProvider::new(cli.ollama_url, cli.model)?);
    let manager = Arc::new(AgentManager::new(
        provider.clone(),
        Arc::new(BuiltinTools::new()),
    ));
    let app_state = state::AppState::new(manager, provider);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(app_state)
        .route(
            "/openapi.json",
            get(|| async { Json(openapi::ApiDoc::openapi()) }),
        )
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

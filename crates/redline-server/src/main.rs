//! HTTP host for the Redline contract-analysis pipeline.

mod routes;

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let provider = redline_llm::provider_from_env()?.ok_or("OPENAI_API_KEY is not set")?;
    let state = routes::AppState::new(provider);

    let addr: SocketAddr = std::env::var("REDLINE_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "redline server listening");
    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}

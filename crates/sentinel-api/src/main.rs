//! Binary entrypoint for the Sentinel API server.
use sentinel_api::run;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Default listen address can be overridden with SENTINEL_ADDR
    let addr = std::env::var("SENTINEL_ADDR").unwrap_or_else(|_| "0.0.0.0:8990".to_string());
    run(&addr).await;
}

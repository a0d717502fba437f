//! Runs a Parlor server configured from `PARLOR_*` environment variables.
//!
//! ```text
//! PARLOR_BIND=0.0.0.0:8080 \
//! PARLOR_HEALTH_BIND=0.0.0.0:8081 \
//! PARLOR_STORE_URL=redis://127.0.0.1:6379 \
//! cargo run -p parlor-server
//! ```
//!
//! Logging follows `RUST_LOG` (default `info`).

use parlor::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let store = match &config.store {
        StoreUrl::Memory => "memory",
        StoreUrl::Redis(_) => "redis",
    };
    tracing::info!(bind = %config.bind, %store, "starting parlor server");

    let server = ParlorServer::builder().config(config).build().await?;
    server.run().await?;
    Ok(())
}

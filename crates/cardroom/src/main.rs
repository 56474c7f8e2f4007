//! Cardroom server binary.
//!
//! Configuration comes from the environment:
//! - `CARDROOM_ADDR` — bind address (default `127.0.0.1:8080`)
//! - `CARDROOM_DATA` — snapshot directory (default `./cardroom-data`)
//! - `RUST_LOG` — tracing filter (default `info`)

use cardroom::Server;
use cardroom_store::JsonFileStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = std::env::var("CARDROOM_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let data_dir = std::env::var("CARDROOM_DATA")
        .unwrap_or_else(|_| "./cardroom-data".to_string());

    let store = JsonFileStore::open(data_dir).await?;
    let server = Server::<JsonFileStore>::builder().bind(&addr).build(store).await?;
    tracing::info!(%addr, "cardroom listening");
    server.run().await?;
    Ok(())
}

//! Relay command handler

use anyhow::Result;

use listsync_core::{Config, RelayServer};

use crate::output::Output;

/// Run the relay server until interrupted
pub async fn run(listen: Option<String>, output: &Output) -> Result<()> {
    let config = Config::load()?;
    let addr = listen.unwrap_or(config.listen_addr);

    let relay = RelayServer::bind(&addr).await?;
    output.message(&format!("Relay listening on {}", relay.local_addr()?));
    tracing::info!(addr = %relay.local_addr()?, "Relay started");

    relay.run().await
}

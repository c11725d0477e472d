//! To-do command handlers
//!
//! `add`, `rm` and `move` are one-shot: they open the store, apply the
//! mutation, and when sync is configured they connect to the relay just
//! long enough to broadcast the change. `watch` keeps the connection open
//! and applies peer messages until interrupted.

use std::time::Duration;

use anyhow::{bail, Result};

use listsync_core::{
    spawn_channel, ChannelCommand, ChannelConfig, ChannelEvent, ChannelHandle, Config, ItemId,
    LocalStore, SyncClient, SyncStatus,
};

use crate::output::Output;

/// How long a one-shot command waits for the relay before going offline
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Open the sync client backed by the configured store
fn open_client(config: &Config) -> SyncClient {
    SyncClient::new(LocalStore::new(config.store_path()))
}

/// Connect to the relay when sync is configured
///
/// Returns `None` (offline mode) when sync is disabled, no relay URL is
/// set, or the relay does not answer within the timeout.
async fn connect(config: &Config, client: &mut SyncClient, output: &Output) -> Option<ChannelHandle> {
    if !config.sync_enabled {
        return None;
    }
    let url = config.relay_url.as_deref()?;

    let mut handle = spawn_channel(ChannelConfig::new(url));
    match tokio::time::timeout(CONNECT_TIMEOUT, handle.event_rx.recv()).await {
        Ok(Some(ChannelEvent::Connected(tx))) => {
            client.attach(tx);
            Some(handle)
        }
        _ => {
            tracing::debug!(url = %url, "Relay did not answer within the connect timeout");
            if !output.is_quiet() {
                eprintln!("⚠ Relay unreachable at {}, working offline", url);
            }
            let _ = handle.command_tx.send(ChannelCommand::Shutdown).await;
            None
        }
    }
}

/// Flush queued messages and stop the channel task
async fn shutdown(handle: ChannelHandle) {
    let mut handle = handle;
    let _ = handle.command_tx.send(ChannelCommand::Shutdown).await;
    // Queued frames drain before the socket closes; don't wait forever
    let _ = tokio::time::timeout(
        Duration::from_secs(1),
        handle.status_rx.wait_for(|s| *s == SyncStatus::Disconnected),
    )
    .await;
}

/// Add an item
pub async fn add(text: String, output: &Output) -> Result<()> {
    let config = Config::load()?;
    let mut client = open_client(&config);
    let handle = connect(&config, &mut client, output).await;

    let Some(item) = client.add_local(&text) else {
        bail!("Cannot add an empty item");
    };

    if let Some(handle) = handle {
        shutdown(handle).await;
    }
    output.print_item(&item);
    Ok(())
}

/// Remove an item by id
pub async fn remove(id: ItemId, output: &Output) -> Result<()> {
    let config = Config::load()?;
    let mut client = open_client(&config);
    let handle = connect(&config, &mut client, output).await;

    let removed = client.remove_local(id);

    if let Some(handle) = handle {
        shutdown(handle).await;
    }
    match removed {
        Some(item) => output.success(&format!("Removed: {}", item.text)),
        None => output.message(&format!("No item with id {} (remove broadcast anyway)", id)),
    }
    Ok(())
}

/// Relocate an item to follow another (or to the end)
pub async fn relocate(id: ItemId, after: Option<ItemId>, output: &Output) -> Result<()> {
    let config = Config::load()?;
    let mut client = open_client(&config);
    let handle = connect(&config, &mut client, output).await;

    let moved = client.reorder_local(id, after);

    if let Some(handle) = handle {
        shutdown(handle).await;
    }
    if !moved {
        bail!("No item with id {}", id);
    }
    output.print_items(client.items());
    Ok(())
}

/// Print the list
pub fn list(output: &Output) -> Result<()> {
    let config = Config::load()?;
    let client = open_client(&config);
    output.print_items(client.items());
    Ok(())
}

/// Stay connected and apply peer changes until Ctrl-C
pub async fn watch(output: &Output) -> Result<()> {
    let config = Config::load()?;
    if !config.sync_enabled {
        bail!(
            "Sync is not enabled. Enable it with:\n  \
             listsync config set sync_enabled true\n  \
             listsync config set relay_url ws://your-server:3000"
        );
    }
    let Some(ref url) = config.relay_url else {
        bail!(
            "Relay URL not configured. Set it with:\n  \
             listsync config set relay_url ws://your-server:3000"
        );
    };

    let mut client = open_client(&config);
    let mut handle = spawn_channel(ChannelConfig::new(url.as_str()));
    output.message(&format!("Watching {} (Ctrl-C to stop)", url));
    output.print_items(client.items());

    loop {
        tokio::select! {
            event = handle.event_rx.recv() => {
                match event {
                    Some(ChannelEvent::Connected(tx)) => {
                        client.attach(tx);
                        output.message("Connected to relay");
                    }
                    Some(ChannelEvent::Disconnected) => {
                        client.detach();
                        output.message("Disconnected from relay, retrying...");
                    }
                    Some(ChannelEvent::Remote(msg)) => {
                        client.apply_remote(msg);
                        output.print_items(client.items());
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    let _ = handle.command_tx.send(ChannelCommand::Shutdown).await;
    Ok(())
}

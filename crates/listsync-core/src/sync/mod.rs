//! List synchronization
//!
//! Two halves: the [`SyncClient`] state machine that owns the list, the
//! store, and the local/remote mutation rules, and the [`channel`] task
//! that keeps a websocket connection to the relay alive and shuttles
//! [`SyncMessage`](crate::protocol::SyncMessage)s both ways.

mod channel;
mod client;

pub use channel::{
    spawn_channel, ChannelCommand, ChannelConfig, ChannelEvent, ChannelHandle,
};
pub use client::{SyncClient, SyncStatus};

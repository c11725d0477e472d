//! listsync core library
//!
//! Collaborative to-do list synchronization: each client keeps a locally
//! persisted ordered list of items and mirrors every mutation (add, remove,
//! reorder) to other connected clients through a stateless relay server.
//! The relay holds no list state; it only fans messages out.
//!
//! # Modules
//!
//! - `models`: the to-do `Item`
//! - `list`: the ordered visible list and its relocation algorithm
//! - `store`: JSON-blob persistence of the list
//! - `protocol`: tagged wire messages (add / remove / reorder)
//! - `sync`: the client state machine and the websocket broadcast channel
//! - `relay`: the fan-out server
//! - `drag`: pointer-position to reorder-action mapping
//! - `config`: application configuration

pub mod config;
pub mod drag;
pub mod list;
pub mod models;
pub mod protocol;
pub mod relay;
pub mod store;
pub mod sync;

pub use config::Config;
pub use list::TodoList;
pub use models::{Item, ItemId};
pub use protocol::SyncMessage;
pub use relay::RelayServer;
pub use store::{LocalStore, StoreError};
pub use sync::{
    spawn_channel, ChannelCommand, ChannelConfig, ChannelEvent, ChannelHandle, SyncClient,
    SyncStatus,
};

//! The shared state store behind every Parlor process.
//!
//! Sessions, rooms, game state and chat history all live here rather than
//! in process memory, so any number of stateless server processes can
//! serve the same rooms. The store also carries the pub/sub channel used
//! for cross-process fanout.
//!
//! [`StateStore`] is the contract. Two backends implement it:
//!
//! - [`RedisStore`] — production, backed by a Redis server.
//! - [`MemoryStore`] — a single-process stand-in for tests and local runs.
//!
//! Services hold an `Arc<dyn StateStore>` and never know which one they got.

mod error;
pub mod keys;
mod memory;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Messages published on a channel, in the order the store delivered them.
pub type Subscription = mpsc::Receiver<String>;

/// Remote key/value store with per-key expiry, sets, capped lists and
/// publish/subscribe.
///
/// Every method is a network round trip on the production backend. None of
/// them are transactional with each other; callers do read-modify-write.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Reads a string value. Missing and expired keys are `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a string value, replacing whatever was there. With a `ttl`
    /// the key disappears after that long unless refreshed.
    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError>;

    /// Removes a key of any kind. Removing a missing key is not an error.
    async fn del(&self, key: &str) -> Result<(), StoreError>;

    /// Resets a key's time-to-live. Returns `false` if the key is gone.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Adds `member` to the set at `key`, creating it if needed.
    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// Removes `member` from the set at `key`.
    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// All members of the set at `key`; empty if missing.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Pushes `value` onto the head of the list at `key` and trims the list
    /// to its newest `max_len` entries.
    async fn list_push_capped(
        &self,
        key: &str,
        value: &str,
        max_len: usize,
    ) -> Result<(), StoreError>;

    /// Up to `limit` entries from the head (newest first) of the list at `key`.
    async fn list_range(&self, key: &str, limit: usize) -> Result<Vec<String>, StoreError>;

    /// Every live key starting with `prefix`. A full scan; use sparingly.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Publishes `payload` to every current subscriber of `channel`.
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), StoreError>;

    /// Subscribes to `channel` until the returned receiver is dropped.
    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError>;
}

/// Reads and deserializes a JSON record.
///
/// # Errors
/// [`StoreError::Corrupt`] if the stored text is not a valid `T`.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_owned(),
                source,
            }),
        None => Ok(None),
    }
}

/// Serializes and writes a JSON record.
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn StateStore,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(StoreError::Serialize)?;
    store.set(key, &raw, ttl).await
}

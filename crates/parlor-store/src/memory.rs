//! In-process [`StateStore`] for tests and single-process deployments.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use crate::{StateStore, StoreError, Subscription};

/// Per-channel buffer. Subscribers that fall further behind skip messages.
const CHANNEL_CAPACITY: usize = 1024;

enum Slot {
    Str(String),
    Set(BTreeSet<String>),
    List(VecDeque<String>),
}

struct Entry {
    slot: Slot,
    expires_at: Option<Instant>,
}

impl Entry {
    fn live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// A [`StateStore`] that keeps everything in a `HashMap`.
///
/// TTLs are honoured lazily: expired keys vanish the next time anything
/// touches them. Time comes from `tokio::time`, so tests can pause and
/// advance the clock. Pub/sub only reaches subscribers in this process.
pub struct MemoryStore {
    data: Mutex<HashMap<String, Entry>>,
    channels: Mutex<HashMap<String, broadcast::Sender<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `f` against the live entry at `key`, purging it first if expired.
    fn with_live<R>(
        &self,
        key: &str,
        f: impl FnOnce(Option<&mut Entry>) -> R,
    ) -> R {
        let mut data = self.data.lock();
        let now = Instant::now();
        if data.get(key).is_some_and(|e| !e.live(now)) {
            data.remove(key);
        }
        f(data.get_mut(key))
    }

    fn sender(&self, channel: &str) -> broadcast::Sender<String> {
        self.channels
            .lock()
            .entry(channel.to_owned())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_live(key, |entry| match entry {
            None => Ok(None),
            Some(Entry { slot: Slot::Str(s), .. }) => Ok(Some(s.clone())),
            Some(_) => Err(StoreError::WrongType(key.to_owned())),
        })
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let entry = Entry {
            slot: Slot::Str(value.to_owned()),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.data.lock().insert(key.to_owned(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        self.data.lock().remove(key);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        Ok(self.with_live(key, |entry| match entry {
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                true
            }
            None => false,
        }))
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock();
        let now = Instant::now();
        let entry = data
            .entry(key.to_owned())
            .and_modify(|e| {
                if !e.live(now) {
                    *e = Entry { slot: Slot::Set(BTreeSet::new()), expires_at: None };
                }
            })
            .or_insert_with(|| Entry { slot: Slot::Set(BTreeSet::new()), expires_at: None });
        match &mut entry.slot {
            Slot::Set(members) => {
                members.insert(member.to_owned());
                Ok(())
            }
            _ => Err(StoreError::WrongType(key.to_owned())),
        }
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock();
        let emptied = match data.get_mut(key) {
            None => return Ok(()),
            Some(Entry { slot: Slot::Set(members), .. }) => {
                members.remove(member);
                members.is_empty()
            }
            Some(_) => return Err(StoreError::WrongType(key.to_owned())),
        };
        // Redis drops empty sets; match that.
        if emptied {
            data.remove(key);
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.with_live(key, |entry| match entry {
            None => Ok(Vec::new()),
            Some(Entry { slot: Slot::Set(members), .. }) => {
                Ok(members.iter().cloned().collect())
            }
            Some(_) => Err(StoreError::WrongType(key.to_owned())),
        })
    }

    async fn list_push_capped(
        &self,
        key: &str,
        value: &str,
        max_len: usize,
    ) -> Result<(), StoreError> {
        let mut data = self.data.lock();
        let now = Instant::now();
        if data.get(key).is_some_and(|e| !e.live(now)) {
            data.remove(key);
        }
        let entry = data
            .entry(key.to_owned())
            .or_insert_with(|| Entry { slot: Slot::List(VecDeque::new()), expires_at: None });
        match &mut entry.slot {
            Slot::List(items) => {
                items.push_front(value.to_owned());
                items.truncate(max_len);
                Ok(())
            }
            _ => Err(StoreError::WrongType(key.to_owned())),
        }
    }

    async fn list_range(&self, key: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        self.with_live(key, |entry| match entry {
            None => Ok(Vec::new()),
            Some(Entry { slot: Slot::List(items), .. }) => {
                Ok(items.iter().take(limit).cloned().collect())
            }
            Some(_) => Err(StoreError::WrongType(key.to_owned())),
        })
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut data = self.data.lock();
        let now = Instant::now();
        data.retain(|_, e| e.live(now));
        let mut keys: Vec<String> = data
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<(), StoreError> {
        // No subscribers is not an error; the message is simply dropped.
        let _ = self.sender(channel).send(payload.to_owned());
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError> {
        let mut rx = self.sender(channel).subscribe();
        let (tx, out) = mpsc::channel(CHANNEL_CAPACITY);
        let channel = channel.to_owned();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(msg) => {
                        if tx.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(%channel, skipped, "subscriber lagged, messages dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::new();
        store.set("k", "v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expires_key() {
        let store = MemoryStore::new();
        store.set("k", "v", Some(Duration::from_secs(10))).await.unwrap();
        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(store.get("k").await.unwrap().is_some());
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_refreshes_ttl() {
        let store = MemoryStore::new();
        store.set("k", "v", Some(Duration::from_secs(10))).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        assert!(store.expire("k", Duration::from_secs(10)).await.unwrap());
        tokio::time::advance(Duration::from_secs(8)).await;
        assert!(store.get("k").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expire_missing_key_returns_false() {
        let store = MemoryStore::new();
        assert!(!store.expire("gone", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_membership() {
        let store = MemoryStore::new();
        store.set_add("s", "a").await.unwrap();
        store.set_add("s", "b").await.unwrap();
        store.set_add("s", "a").await.unwrap();
        assert_eq!(store.set_members("s").await.unwrap(), vec!["a", "b"]);

        store.set_remove("s", "a").await.unwrap();
        assert_eq!(store.set_members("s").await.unwrap(), vec!["b"]);

        store.set_remove("s", "b").await.unwrap();
        assert!(store.keys("s").await.unwrap().is_empty(), "empty set is dropped");
    }

    #[tokio::test]
    async fn test_wrong_type_is_reported() {
        let store = MemoryStore::new();
        store.set("k", "v", None).await.unwrap();
        let err = store.set_add("k", "m").await.unwrap_err();
        assert!(matches!(err, StoreError::WrongType(_)));
    }

    #[tokio::test]
    async fn test_capped_list_keeps_newest() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.list_push_capped("l", &i.to_string(), 3).await.unwrap();
        }
        assert_eq!(store.list_range("l", 10).await.unwrap(), vec!["4", "3", "2"]);
        assert_eq!(store.list_range("l", 2).await.unwrap(), vec!["4", "3"]);
    }

    #[tokio::test]
    async fn test_capped_list_with_zero_cap_keeps_nothing() {
        let store = MemoryStore::new();
        store.list_push_capped("l", "a", 0).await.unwrap();
        assert!(store.list_range("l", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_keys_by_prefix() {
        let store = MemoryStore::new();
        store.set("room:b", "{}", None).await.unwrap();
        store.set("room:a", "{}", None).await.unwrap();
        store.set_add("room_sessions:a", "s").await.unwrap();
        assert_eq!(store.keys("room:").await.unwrap(), vec!["room:a", "room:b"]);
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber_in_order() {
        let store = MemoryStore::new();
        let mut a = store.subscribe("ch").await.unwrap();
        let mut b = store.subscribe("ch").await.unwrap();

        store.publish("ch", "one").await.unwrap();
        store.publish("ch", "two").await.unwrap();

        assert_eq!(a.recv().await.as_deref(), Some("one"));
        assert_eq!(a.recv().await.as_deref(), Some("two"));
        assert_eq!(b.recv().await.as_deref(), Some("one"));
        assert_eq!(b.recv().await.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let store = MemoryStore::new();
        store.publish("nobody", "hello").await.unwrap();
    }
}

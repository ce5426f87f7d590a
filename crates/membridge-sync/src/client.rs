//! Remote endpoint abstraction.
//!
//! The remote service exposes two read paths the bridge cares about: the
//! sync endpoint that answers "everything changed since T" with a changeset
//! payload, and the media store that serves referenced files by path.
//! [`RemoteClient`] abstracts both so the sync cycle and the translator can
//! run against the HTTP service or a scripted test double.

use async_trait::async_trait;
use bytes::Bytes;

use membridge_core::ChangesetPayload;

use crate::error::Result;

/// Client-side view of the remote service.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetch every change since the given timestamp (ms since epoch).
    ///
    /// A caller that has never synced passes 0 and receives the full
    /// collection set. The payload comes back raw; decoding and validation
    /// happen on the caller's side.
    async fn pull(&self, since_ms: i64) -> Result<ChangesetPayload>;

    /// Fetch a media object by its storage path.
    ///
    /// Returns `None` when the remote store has no object at that path.
    /// Only transport failures are errors.
    async fn fetch_media(&self, path: &str) -> Result<Option<Bytes>>;
}

/// A scripted in-memory remote for testing.
pub mod memory {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use crate::error::SyncError;

    /// In-memory remote serving queued payloads and a path-keyed media map.
    ///
    /// Each `pull` pops the next queued payload; an empty queue serves an
    /// empty changeset, like a server with nothing new. `since` arguments
    /// are recorded so tests can assert on cursor propagation.
    #[derive(Default)]
    pub struct MemoryRemote {
        queue: Mutex<VecDeque<ChangesetPayload>>,
        media: Mutex<HashMap<String, Bytes>>,
        pulls: Mutex<Vec<i64>>,
        fail_pull: Mutex<Option<String>>,
        fail_media: Mutex<Option<String>>,
    }

    impl MemoryRemote {
        /// Create an empty remote.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a payload for the next pull.
        pub fn push_payload(&self, payload: ChangesetPayload) {
            self.queue.lock().unwrap().push_back(payload);
        }

        /// Serve `bytes` for the given media path.
        pub fn put_media(&self, path: impl Into<String>, bytes: impl Into<Bytes>) {
            self.media.lock().unwrap().insert(path.into(), bytes.into());
        }

        /// Make the next pull fail with a transport error.
        pub fn fail_next_pull(&self, message: impl Into<String>) {
            *self.fail_pull.lock().unwrap() = Some(message.into());
        }

        /// Make the next media fetch fail with a transport error.
        pub fn fail_next_media(&self, message: impl Into<String>) {
            *self.fail_media.lock().unwrap() = Some(message.into());
        }

        /// The `since` arguments seen so far, in call order.
        pub fn recorded_pulls(&self) -> Vec<i64> {
            self.pulls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteClient for MemoryRemote {
        async fn pull(&self, since_ms: i64) -> Result<ChangesetPayload> {
            if let Some(message) = self.fail_pull.lock().unwrap().take() {
                return Err(SyncError::Transport(message));
            }
            self.pulls.lock().unwrap().push(since_ms);
            Ok(self.queue.lock().unwrap().pop_front().unwrap_or_default())
        }

        async fn fetch_media(&self, path: &str) -> Result<Option<Bytes>> {
            if let Some(message) = self.fail_media.lock().unwrap().take() {
                return Err(SyncError::Transport(message));
            }
            Ok(self.media.lock().unwrap().get(path).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryRemote;
    use super::*;
    use crate::error::SyncError;
    use membridge_testkit::{cards_payload, make_card};

    #[tokio::test]
    async fn test_memory_remote_serves_queued_payloads_in_order() {
        let remote = MemoryRemote::new();
        remote.push_payload(cards_payload(&[make_card(1, 1, 2)]));
        remote.push_payload(cards_payload(&[make_card(2, 1, 2)]));

        let first = remote.pull(0).await.unwrap();
        let second = remote.pull(100).await.unwrap();
        let drained = remote.pull(200).await.unwrap();

        assert!(!first.is_empty());
        assert!(!second.is_empty());
        assert!(drained.is_empty());
        assert_eq!(remote.recorded_pulls(), vec![0, 100, 200]);
    }

    #[tokio::test]
    async fn test_memory_remote_media_lookup() {
        let remote = MemoryRemote::new();
        remote.put_media("ab/cd.mp3", Bytes::from_static(b"audio"));

        let hit = remote.fetch_media("ab/cd.mp3").await.unwrap();
        let miss = remote.fetch_media("missing.mp3").await.unwrap();

        assert_eq!(hit, Some(Bytes::from_static(b"audio")));
        assert_eq!(miss, None);
    }

    #[tokio::test]
    async fn test_memory_remote_scripted_failures() {
        let remote = MemoryRemote::new();
        remote.fail_next_pull("connection reset");

        let err = remote.pull(0).await.unwrap_err();
        assert!(matches!(err, SyncError::Transport(_)));

        // The failure is one-shot; the next pull succeeds again.
        assert!(remote.pull(0).await.is_ok());
    }
}

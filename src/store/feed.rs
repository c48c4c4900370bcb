//! Change feed - Broadcast of committed document changes

use super::DocumentChange;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// Default capacity of the broadcast buffer. Slow subscribers that fall behind
/// by more than this lose the oldest events.
pub const CHANGE_FEED_CAPACITY: usize = 1024;

pub type ChangeStream = BoxStream<'static, DocumentChange>;

/// In-process fan-out of [`DocumentChange`]s, shared by the store backends.
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<DocumentChange>,
    next_seq: Arc<AtomicU64>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::with_capacity(CHANGE_FEED_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            next_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Stamps the change with the next sequence number and publishes it.
    /// Having no subscriber is not an error.
    pub fn publish(&self, mut change: DocumentChange) {
        change.seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.tx.send(change) {
            debug!(
                collection = %e.0.collection,
                id = %e.0.id,
                "No subscribers for document change"
            );
        }
    }

    pub fn subscribe(&self, collection: &str) -> ChangeStream {
        let collection = collection.to_string();
        BroadcastStream::new(self.tx.subscribe())
            .filter_map(move |item| {
                let wanted = match item {
                    Ok(change) if change.collection == collection => Some(change),
                    Ok(_) => None,
                    Err(e) => {
                        warn!(collection = %collection, "Change feed subscriber lagged: {}", e);
                        None
                    }
                };
                futures::future::ready(wanted)
            })
            .boxed()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identical_changes_get_distinct_seq() {
        let feed = ChangeFeed::new();
        let mut changes = feed.subscribe("invites");

        for _ in 0..2 {
            feed.publish(DocumentChange::new("invites", "i1", None, None));
        }
        feed.publish(DocumentChange::new("users", "u1", None, None));

        let first = changes.next().await.unwrap();
        let second = changes.next().await.unwrap();
        assert_eq!(first.id, "i1");
        assert!(second.seq > first.seq);
    }
}

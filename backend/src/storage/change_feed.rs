//! In-process change notifications.
//!
//! Every committed write publishes a [`ChangeEvent`]. Subscribers that fall
//! behind lose the oldest events and are expected to re-read their view.

use shared::{ChangeEvent, ChangeKind, Collection};
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, collection: Collection, kind: ChangeKind, key: impl Into<String>) {
        let event = ChangeEvent {
            collection,
            kind,
            key: key.into(),
        };
        // An error only means nobody is listening right now
        if self.sender.send(event.clone()).is_err() {
            debug!("No subscribers for change {:?}", event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

//! Notification hub.
//!
//! Explicit observer registry: each subscriber owns a bounded channel and
//! receives every committed [`Snapshot`] published after it subscribed.
//! Delivery is non-blocking; a subscriber that is gone or not keeping up is
//! dropped from the registry without affecting anyone else.

use std::collections::HashMap;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::Snapshot;

/// Identifies one subscriber.
pub type SubscriberId = Uuid;

/// Receiving side handed to a subscriber.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<Snapshot>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next published snapshot. `None` once unsubscribed.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.receiver.recv().await
    }

    /// Next snapshot if one is already queued.
    pub fn try_recv(&mut self) -> Option<Snapshot> {
        self.receiver.try_recv().ok()
    }
}

#[derive(Debug, Default)]
struct Registry {
    subscribers: HashMap<SubscriberId, mpsc::Sender<Snapshot>>,
    last_revision: Option<u64>,
}

/// Fan-out of committed stats to subscribers.
#[derive(Debug)]
pub struct NotificationHub {
    registry: Mutex<Registry>,
    capacity: usize,
}

impl NotificationHub {
    /// `capacity` is the per-subscriber queue length (at least 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            capacity: capacity.max(1),
        }
    }

    pub async fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = Uuid::new_v4();

        let mut registry = self.registry.lock().await;
        registry.subscribers.insert(id, tx);
        debug!("Subscriber {} added ({} total)", id, registry.subscribers.len());

        Subscription { id, receiver: rx }
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut registry = self.registry.lock().await;
        let removed = registry.subscribers.remove(&id).is_some();
        if removed {
            debug!("Subscriber {} removed ({} left)", id, registry.subscribers.len());
        }
        removed
    }

    pub async fn subscriber_count(&self) -> usize {
        self.registry.lock().await.subscribers.len()
    }

    /// Deliver `snapshot` to every subscriber. Returns how many received it.
    ///
    /// Snapshots older than one already published are discarded, so a
    /// publish that lost a race with a later commit never overwrites it.
    pub async fn publish(&self, snapshot: &Snapshot) -> usize {
        let mut registry = self.registry.lock().await;

        if registry
            .last_revision
            .is_some_and(|last| snapshot.revision < last)
        {
            debug!(
                "Skipping stale revision {} (already published {:?})",
                snapshot.revision, registry.last_revision
            );
            return 0;
        }
        registry.last_revision = Some(snapshot.revision);

        let mut delivered = 0;
        let mut dropped = Vec::new();

        for (id, tx) in &registry.subscribers {
            match tx.try_send(*snapshot) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!("Subscriber {} disconnected, removing", id);
                    dropped.push(*id);
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("Subscriber {} is not keeping up, removing", id);
                    dropped.push(*id);
                }
            }
        }

        for id in dropped {
            registry.subscribers.remove(&id);
        }

        debug!(
            "Published revision {} to {} subscriber(s)",
            snapshot.revision, delivered
        );
        delivered
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(32)
    }
}

//! Rank service.
//!
//! The operation surface used by every transport: record outcomes, read and
//! write stats, project rank progress and manage live subscriptions. Each
//! mutation runs as one read-modify-write on the [`StatsStore`] and is then
//! published on the [`NotificationHub`] after the store lock is released.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::hub::{NotificationHub, SubscriberId, Subscription};
use crate::ladder::RankLadder;
use crate::models::{Outcome, StatField, Stats};
use crate::progression::{self, RankProgress};
use crate::storage::{Snapshot, StatsStore, StorageError};

/// Service errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid value: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Check that `value` fits `field` (non-negative, 32-bit).
pub fn validate_value(field: StatField, value: i64) -> Result<u32, ServiceError> {
    if value < 0 {
        return Err(ServiceError::Validation(format!(
            "{} cannot be negative (got {})",
            field, value
        )));
    }
    u32::try_from(value).map_err(|_| {
        ServiceError::Validation(format!("{} is too large (got {})", field, value))
    })
}

pub struct RankService {
    store: StatsStore,
    ladder: Arc<RankLadder>,
    hub: NotificationHub,
}

impl RankService {
    pub fn new(store: StatsStore, ladder: Arc<RankLadder>, hub: NotificationHub) -> Self {
        Self { store, ladder, hub }
    }

    pub fn ladder(&self) -> &RankLadder {
        &self.ladder
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    /// Commit one match outcome and return the resulting stats.
    pub async fn record_outcome(&self, outcome: Outcome) -> Result<Stats, ServiceError> {
        let ladder = self.ladder.clone();
        let mut before = Stats::default();

        let snapshot = self
            .store
            .update(|current| {
                before = *current;
                Ok::<_, ServiceError>(progression::apply_outcome(&ladder, current, outcome))
            })
            .await?;

        let after = snapshot.stats;
        info!(
            "Recorded {}: points {} -> {}, rank {} -> {}, streak {}",
            outcome,
            before.points,
            after.points,
            ladder.rank_for_points(before.points),
            ladder.rank_for_points(after.points),
            after.win_streak
        );

        self.broadcast(&snapshot).await;
        Ok(after)
    }

    pub async fn get_stats(&self) -> Result<Stats, ServiceError> {
        Ok(self.store.get().await?)
    }

    /// Replace every field at once.
    pub async fn set_stats(&self, stats: Stats) -> Result<Stats, ServiceError> {
        let snapshot = self.store.set(stats).await?;
        info!("Stats replaced: {:?}", snapshot.stats);
        self.broadcast(&snapshot).await;
        Ok(snapshot.stats)
    }

    pub async fn get_field(&self, field: StatField) -> Result<u32, ServiceError> {
        Ok(self.store.get().await?.get(field))
    }

    /// Set a single field. Negative or oversized values are rejected
    /// before the store is touched.
    pub async fn set_field(&self, field: StatField, value: i64) -> Result<Stats, ServiceError> {
        let value = validate_value(field, value)?;

        let snapshot = self
            .store
            .update(|current| {
                let mut next = *current;
                next.set(field, value);
                Ok::<_, ServiceError>(next)
            })
            .await?;

        info!("Set {} = {}", field, value);
        self.broadcast(&snapshot).await;
        Ok(snapshot.stats)
    }

    /// Zero every field.
    pub async fn reset(&self) -> Result<Stats, ServiceError> {
        self.set_stats(Stats::default()).await
    }

    /// Where the current stats sit on the ladder.
    pub async fn progress(&self) -> Result<RankProgress, ServiceError> {
        let stats = self.store.get().await?;
        Ok(RankProgress::from_stats(&self.ladder, &stats))
    }

    /// Subscribe to updates. The returned snapshot is read after the
    /// subscription is registered, so no commit falls in between.
    pub async fn connect(&self) -> Result<(Subscription, Snapshot), ServiceError> {
        let subscription = self.hub.subscribe().await;
        match self.store.snapshot().await {
            Ok(snapshot) => Ok((subscription, snapshot)),
            Err(e) => {
                self.hub.unsubscribe(subscription.id()).await;
                Err(e.into())
            }
        }
    }

    pub async fn disconnect(&self, id: SubscriberId) {
        self.hub.unsubscribe(id).await;
    }

    async fn broadcast(&self, snapshot: &Snapshot) {
        let delivered = self.hub.publish(snapshot).await;
        if delivered == 0 && self.hub.subscriber_count().await > 0 {
            warn!("Revision {} reached no subscribers", snapshot.revision);
        }
    }
}

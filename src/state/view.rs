use crate::metrics::Metrics;
use crate::snapshot::Snapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One published (snapshot, metrics) pair.
///
/// Owned by the engine's current slot. Consumers hold read-only `Arc` clones
/// and derive their own ephemeral projections; nothing feeds back into a
/// published view.
#[derive(Clone, Debug, Serialize)]
pub struct AggregatedView {
    pub snapshot: Snapshot,
    pub metrics: Metrics,

    /// Arrival time of the message that produced this view.
    /// None for the initial empty view.
    pub received_at: Option<DateTime<Utc>>,
}

impl AggregatedView {
    /// Empty view published before the first upstream message.
    /// Carries the statically configured exit-capacity fallback.
    pub fn initial(exit_capacity: HashMap<String, u32>) -> Self {
        let snapshot = Snapshot::initial(exit_capacity);
        let metrics = Metrics::derive(&snapshot, 0);
        Self {
            snapshot,
            metrics,
            received_at: None,
        }
    }

    /// Staleness indicator: seconds since the last update arrived.
    /// None until the first message is processed.
    pub fn seconds_since_update(&self) -> Option<i64> {
        self.received_at.map(|at| (Utc::now() - at).num_seconds())
    }
}

use crate::metrics::Metrics;
use crate::snapshot::Snapshot;
use crate::state::view::AggregatedView;
use crate::update::UpdateMessage;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

/// ViewEngine maintains the single current aggregated view.
///
/// Each upstream message produces a brand-new immutable view that replaces
/// the previous one wholesale; the old view stays valid for any consumer
/// still holding it. The stream adapter invokes `apply_update` from one task
/// so messages fold in strictly in arrival order.
pub struct ViewEngine {
    /// Current published view, replaced per update, never mutated in place
    current: RwLock<Arc<AggregatedView>>,

    /// Messages processed since this engine was created
    update_count: AtomicU64,

    /// Broadcast channel for published views
    view_tx: broadcast::Sender<Arc<AggregatedView>>,
}

impl ViewEngine {
    pub fn new() -> Self {
        Self::with_capacity_fallback(HashMap::new())
    }

    /// Engine whose initial capacity table comes from static configuration.
    /// The table is used until upstream supplies `exit_capacity`.
    pub fn with_capacity_fallback(exit_capacity: HashMap<String, u32>) -> Self {
        let (view_tx, _) = broadcast::channel(64);

        Self {
            current: RwLock::new(Arc::new(AggregatedView::initial(exit_capacity))),
            update_count: AtomicU64::new(0),
            view_tx,
        }
    }

    /// Fold one upstream message into the next view (core reducer).
    ///
    /// Replacement fields (devices, exits, congestion, fire nodes) come
    /// entirely from the message; the update counter accumulates by exactly
    /// one per message, identical or not; metrics are recomputed fresh from
    /// the new snapshot. Store and broadcast happen under the write lock so
    /// `current()` and subscribers can never disagree about a message.
    pub fn apply_update(&self, msg: UpdateMessage) -> Arc<AggregatedView> {
        let count = self.update_count.fetch_add(1, Ordering::SeqCst) + 1;

        let mut slot = self.current.write().unwrap();
        let snapshot = Snapshot::from_update(msg, &slot.snapshot.exit_capacity);
        let metrics = Metrics::derive(&snapshot, count);
        let view = Arc::new(AggregatedView {
            snapshot,
            metrics,
            received_at: Some(Utc::now()),
        });
        *slot = Arc::clone(&view);

        // Send errors mean no subscribers, which is fine
        let _ = self.view_tx.send(Arc::clone(&view));
        drop(slot);

        debug!(
            update_count = count,
            devices = view.snapshot.devices.len(),
            fire_alerts = view.metrics.fire_alerts,
            "Applied update"
        );

        view
    }

    /// Latest published view
    pub fn current(&self) -> Arc<AggregatedView> {
        Arc::clone(&self.current.read().unwrap())
    }

    /// Subscribe to published views
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<AggregatedView>> {
        self.view_tx.subscribe()
    }

    /// Total messages processed
    pub fn update_count(&self) -> u64 {
        self.update_count.load(Ordering::SeqCst)
    }

    /// Seconds since the last update arrived; None before the first message.
    /// Keeps growing during channel disruption — the staleness indicator.
    pub fn seconds_since_update(&self) -> Option<i64> {
        self.current().seconds_since_update()
    }
}

impl Default for ViewEngine {
    fn default() -> Self {
        Self::new()
    }
}

use crate::state::ViewEngine;
use crate::stream::StreamClient;
use crate::update::UpdateMessage;
use anyhow::{Context, Result};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// StreamAdapter owns the subscription lifecycle on the upstream channel.
///
/// One subscription per adapter: `start` rejects a second call and spawns a
/// single consumer task, so messages fold into the engine strictly in
/// arrival order with no parallel reducer invocations. Teardown through the
/// returned handle stops further delivery but never rolls back
/// already-applied updates.
pub struct StreamAdapter {
    client: StreamClient,
    engine: Arc<ViewEngine>,
    started: AtomicBool,
}

impl StreamAdapter {
    pub fn new(client: StreamClient, engine: Arc<ViewEngine>) -> Self {
        Self {
            client,
            engine,
            started: AtomicBool::new(false),
        }
    }

    /// Subscribe to the update subject and spawn the consumer task.
    ///
    /// Returns a handle whose `stop` tears the subscription down; dropping
    /// the handle has the same effect.
    pub async fn start(&self) -> Result<StreamHandle> {
        if self.started.swap(true, Ordering::SeqCst) {
            anyhow::bail!("stream adapter already started");
        }

        let subject = self.client.subject().to_string();
        let mut subscriber = self
            .client
            .client()
            .subscribe(subject.clone())
            .await
            .context("Failed to subscribe to update subject")?;

        info!(subject = %subject, "Update subscription established");

        let engine = Arc::clone(&self.engine);
        let stopped = Arc::new(AtomicBool::new(false));
        let task_stopped = Arc::clone(&stopped);

        let task = tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                if task_stopped.load(Ordering::SeqCst) {
                    // stop() raced an in-flight delivery; drop it
                    break;
                }
                dispatch(&engine, &task_stopped, &msg.payload);
            }
            info!("Update subscription ended");
        });

        Ok(StreamHandle { stopped, task })
    }
}

/// Decode one raw payload and fold it into the engine.
///
/// Returns false when nothing was applied: the handle was stopped (message
/// is a no-op, never an error) or the payload was malformed (logged and
/// skipped so one bad message never tears down the subscription). Factored
/// out of the consumer task so message handling tests without a live channel.
fn dispatch(engine: &ViewEngine, stopped: &AtomicBool, payload: &[u8]) -> bool {
    if stopped.load(Ordering::SeqCst) {
        return false;
    }

    match serde_json::from_slice::<UpdateMessage>(payload) {
        Ok(update) => {
            let view = engine.apply_update(update);
            debug!(
                update_count = view.metrics.update_count,
                "Update message applied"
            );
            true
        }
        Err(e) => {
            warn!(error = %e, "Malformed update message, skipping");
            false
        }
    }
}

/// Handle to a running subscription
pub struct StreamHandle {
    stopped: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl StreamHandle {
    /// Stop message delivery. Idempotent; already-applied updates are kept.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.task.abort();
            info!("Stream adapter stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_dispatch_applies_valid_message() {
        let engine = ViewEngine::new();
        let stopped = AtomicBool::new(false);

        let applied = dispatch(
            &engine,
            &stopped,
            &payload(json!({"devices": [{"device_tag": "d1"}]})),
        );

        assert!(applied);
        assert_eq!(engine.update_count(), 1);
        assert!(engine.current().snapshot.device("d1").is_some());
    }

    #[test]
    fn test_dispatch_skips_malformed_payload() {
        let engine = ViewEngine::new();
        let stopped = AtomicBool::new(false);

        let applied = dispatch(&engine, &stopped, b"not json at all");

        assert!(!applied);
        // Counter counts processed messages only
        assert_eq!(engine.update_count(), 0);
    }

    #[test]
    fn test_dispatch_after_stop_is_a_noop() {
        let engine = ViewEngine::new();
        let stopped = AtomicBool::new(true);

        let applied = dispatch(
            &engine,
            &stopped,
            &payload(json!({"devices": [{"device_tag": "d1"}]})),
        );

        assert!(!applied);
        assert_eq!(engine.update_count(), 0);
        assert!(engine.current().snapshot.devices.is_empty());
    }

    #[test]
    fn test_dispatch_preserves_arrival_order() {
        let engine = ViewEngine::new();
        let stopped = AtomicBool::new(false);

        dispatch(&engine, &stopped, &payload(json!({"fire_nodes": ["Kitchen"]})));
        dispatch(&engine, &stopped, &payload(json!({"fire_nodes": []})));

        // Last message wins
        assert!(engine.current().snapshot.fire_nodes.is_empty());
        assert_eq!(engine.update_count(), 2);
    }
}

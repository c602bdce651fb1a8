use crate::metrics::Metrics;
use crate::snapshot::Snapshot;
use crate::state::AggregatedView;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Client → Server message types
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Watch one device; forwarded views narrow the device list to the
    /// watched tags
    #[serde(rename = "subscribe")]
    Subscribe { device_tag: String },
    #[serde(rename = "unsubscribe")]
    Unsubscribe { device_tag: String },
}

/// Server → Client: aggregated view notification
#[derive(Debug, Clone, Serialize)]
pub struct ViewMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub snapshot: Snapshot,
    pub metrics: Metrics,
    pub received_at: Option<DateTime<Utc>>,
}

impl ViewMessage {
    /// Project a published view for one connection.
    ///
    /// The projection is a local copy: narrowing the device list to the
    /// watched tags (empty watch set = everything) never touches the shared
    /// view. Exits, congestion, fire state and metrics are always included —
    /// they describe the whole building, not one occupant.
    pub fn project(view: &AggregatedView, watched: &HashSet<String>) -> Self {
        let mut snapshot = view.snapshot.clone();
        if !watched.is_empty() {
            snapshot.devices.retain(|d| watched.contains(&d.device_tag));
        }

        Self {
            msg_type: "view_update".to_string(),
            snapshot,
            metrics: view.metrics.clone(),
            received_at: view.received_at,
        }
    }
}

/// Server → Client: Error message
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub error: String,
}

impl ErrorMessage {
    pub fn new(error: String) -> Self {
        Self {
            msg_type: "error".to_string(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::UpdateMessage;
    use serde_json::json;
    use std::collections::HashMap;

    fn view_with_devices(tags: &[&str]) -> AggregatedView {
        let msg: UpdateMessage = serde_json::from_value(json!({
            "devices": tags.iter().map(|t| json!({"device_tag": t})).collect::<Vec<_>>()
        }))
        .unwrap();
        let snapshot = Snapshot::from_update(msg, &HashMap::new());
        let metrics = Metrics::derive(&snapshot, 1);
        AggregatedView {
            snapshot,
            metrics,
            received_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_client_message_parsing() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "subscribe", "device_tag": "d1"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Subscribe { device_tag } if device_tag == "d1"));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "unsubscribe", "device_tag": "d1"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Unsubscribe { device_tag } if device_tag == "d1"));
    }

    #[test]
    fn test_project_empty_watch_set_forwards_everything() {
        let view = view_with_devices(&["d1", "d2"]);
        let projected = ViewMessage::project(&view, &HashSet::new());

        assert_eq!(projected.msg_type, "view_update");
        assert_eq!(projected.snapshot.devices.len(), 2);
    }

    #[test]
    fn test_project_narrows_to_watched_devices() {
        let view = view_with_devices(&["d1", "d2", "d3"]);
        let watched: HashSet<String> = ["d2".to_string()].into();

        let projected = ViewMessage::project(&view, &watched);

        assert_eq!(projected.snapshot.devices.len(), 1);
        assert_eq!(projected.snapshot.devices[0].device_tag, "d2");
        // The shared view itself is untouched
        assert_eq!(view.snapshot.devices.len(), 3);
    }

    #[test]
    fn test_project_keeps_building_wide_metrics() {
        let view = view_with_devices(&["d1", "d2"]);
        let watched: HashSet<String> = ["d1".to_string()].into();

        let projected = ViewMessage::project(&view, &watched);

        // Metrics describe the whole building regardless of the watch set
        assert_eq!(projected.metrics, view.metrics);
    }
}

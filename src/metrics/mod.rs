use crate::snapshot::Snapshot;
use crate::update::DeviceRecord;
use serde::Serialize;
use std::collections::HashMap;

/// Derived statistics over one snapshot.
///
/// Never independently mutated: every field except `update_count` is
/// recomputed from the snapshot on each update; `update_count` accumulates
/// in the view engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    /// Mean remaining-path length across devices, counted in nodes
    pub average_path_length: f64,

    /// Percentage of nodes with nonzero congestion (0-100, one decimal)
    pub congestion_rate: f64,

    /// Number of nodes currently on fire
    pub fire_alerts: usize,

    /// Messages processed since the view was created
    pub update_count: u64,
}

impl Metrics {
    /// Compute all derived fields from a snapshot
    pub fn derive(snapshot: &Snapshot, update_count: u64) -> Self {
        Self {
            average_path_length: average_path_length(&snapshot.devices),
            congestion_rate: congestion_rate(&snapshot.congestion),
            fire_alerts: snapshot.fire_nodes.len(),
            update_count,
        }
    }
}

/// Mean remaining-path length across devices.
///
/// Path length is the raw node count of the sequence (upstream's convention),
/// so `[Kitchen, Entrance]` counts as 2. Returns 0.0 when there are no
/// devices.
pub fn average_path_length(devices: &[DeviceRecord]) -> f64 {
    if devices.is_empty() {
        return 0.0;
    }
    let total: usize = devices.iter().map(|d| d.shortest_path.len()).sum();
    total as f64 / devices.len() as f64
}

/// Percentage of nodes with nonzero congestion among all known nodes,
/// rounded to one decimal. Returns 0.0 for an empty map, never NaN.
pub fn congestion_rate(congestion: &HashMap<String, u32>) -> f64 {
    if congestion.is_empty() {
        return 0.0;
    }
    let congested = congestion.values().filter(|&&count| count > 0).count();
    let rate = congested as f64 * 100.0 / congestion.len() as f64;
    (rate * 10.0).round() / 10.0
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;


/// 2D position reported by upstream positioning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// One tracked occupant as reported by upstream.
///
/// Every field is optional on the wire; a device with no fix yet arrives
/// without coordinates and defaults to the origin, a device already at its
/// exit arrives without a remaining path.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Tag identifying the occupant's tracker (unique per occupant)
    #[serde(default)]
    pub device_tag: String,

    /// Node the occupant is currently at
    #[serde(default)]
    pub user_location: String,

    /// Exit the upstream router assigned to this occupant
    #[serde(default)]
    pub assigned_exit: String,

    /// Remaining evacuation route as an ordered node sequence
    #[serde(default)]
    pub shortest_path: Vec<String>,

    /// Current position
    #[serde(default)]
    pub coordinates: Coordinates,
}

/// UpdateMessage is one push event from the upstream routing service.
///
/// Each field is an authoritative full replacement of that slice of state,
/// not a delta: an entry absent from the latest message no longer exists.
/// Absent fields deserialize to empty collections so partial payloads are
/// merged with defaults instead of rejected.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateMessage {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,

    /// Exit name -> device tags currently assigned to it
    #[serde(default)]
    pub exits: HashMap<String, Vec<String>>,

    /// Node name -> occupants currently routed through it
    #[serde(default)]
    pub congestion: HashMap<String, u32>,

    /// Nodes classified as on fire in this update
    #[serde(default)]
    pub fire_nodes: Vec<String>,

    /// Exit name -> maximum simultaneous occupants (sent sparsely)
    #[serde(default)]
    pub exit_capacity: HashMap<String, u32>,
}

use crate::update::{DeviceRecord, UpdateMessage};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Snapshot is the canonical aggregated building state at a point in time.
///
/// Pure data container: built once from an upstream message, then read by
/// every consumer through a shared reference. Construction never fails —
/// malformed or missing entries degrade to defaults upstream of here, in the
/// wire model.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Snapshot {
    /// All tracked occupants from the latest message
    pub devices: Vec<DeviceRecord>,

    /// Exit name -> device tags currently assigned to it
    pub exits: HashMap<String, Vec<String>>,

    /// Node name -> occupants currently routed through it
    pub congestion: HashMap<String, u32>,

    /// Nodes on fire. Rebuilt from every message, never merged with history:
    /// a node not listed in the latest message is not on fire.
    pub fire_nodes: HashSet<String>,

    /// Exit name -> maximum simultaneous occupants
    pub exit_capacity: HashMap<String, u32>,
}

impl Snapshot {
    /// Empty snapshot carrying the statically configured capacity table.
    /// This is the state before the first upstream message arrives.
    pub fn initial(exit_capacity: HashMap<String, u32>) -> Self {
        Self {
            exit_capacity,
            ..Default::default()
        }
    }

    /// Build the next snapshot from an upstream message.
    ///
    /// Devices, exits, congestion and fire nodes are full replacements.
    /// The capacity table is sent sparsely, so a message without one carries
    /// the previous table forward.
    pub fn from_update(msg: UpdateMessage, previous_capacity: &HashMap<String, u32>) -> Self {
        let exit_capacity = if msg.exit_capacity.is_empty() {
            previous_capacity.clone()
        } else {
            msg.exit_capacity
        };

        Self {
            devices: msg.devices,
            exits: msg.exits,
            congestion: msg.congestion,
            fire_nodes: msg.fire_nodes.into_iter().collect(),
            exit_capacity,
        }
    }

    /// Look up a device by tag
    pub fn device(&self, tag: &str) -> Option<&DeviceRecord> {
        self.devices.iter().find(|d| d.device_tag == tag)
    }

    /// Per-exit occupancy summary, sorted by exit name.
    ///
    /// Derived per call from the published snapshot — an exit missing from
    /// the capacity table reports `capacity: None` rather than erroring.
    pub fn exit_occupancy(&self) -> Vec<ExitOccupancy> {
        let mut summary: Vec<ExitOccupancy> = self
            .exits
            .iter()
            .map(|(exit, occupants)| {
                let capacity = self.exit_capacity.get(exit).copied();
                ExitOccupancy {
                    exit: exit.clone(),
                    occupied: occupants.len(),
                    over_capacity: capacity.is_some_and(|cap| occupants.len() > cap as usize),
                    capacity,
                }
            })
            .collect();
        summary.sort_by(|a, b| a.exit.cmp(&b.exit));
        summary
    }
}

/// Occupancy readout for one exit
#[derive(Clone, Debug, Serialize)]
pub struct ExitOccupancy {
    pub exit: String,
    pub occupied: usize,
    pub capacity: Option<u32>,
    pub over_capacity: bool,
}

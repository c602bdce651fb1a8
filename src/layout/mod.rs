use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A point on the floor-plan canvas
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Fallback position for nodes missing from the layout table
pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

/// Static node-name -> coordinate table used to draw evacuation paths.
///
/// Configuration, not state: built once, never mutated. An unknown node name
/// from upstream falls back to the origin so the drawing degrades instead of
/// the dashboard crashing on an unrecognized room.
#[derive(Clone, Debug)]
pub struct LayoutTable {
    positions: HashMap<String, Point>,
}

impl LayoutTable {
    pub fn new(positions: HashMap<String, Point>) -> Self {
        Self { positions }
    }

    /// Position of a node, origin for unknown names
    pub fn position(&self, node: &str) -> Point {
        match self.positions.get(node) {
            Some(&point) => point,
            None => {
                debug!(node = %node, "node missing from layout table, using origin");
                ORIGIN
            }
        }
    }

    pub fn contains(&self, node: &str) -> bool {
        self.positions.contains_key(node)
    }

    /// Project an ordered node sequence into canvas coordinates
    pub fn polyline(&self, path: &[String]) -> Vec<Point> {
        path.iter().map(|node| self.position(node)).collect()
    }
}

impl Default for LayoutTable {
    /// Floor plan of the reference building installation
    fn default() -> Self {
        let positions = [
            ("Entrance", 50.0, 50.0),
            ("Verandah", 150.0, 50.0),
            ("Living Room", 250.0, 50.0),
            ("Dining Space", 150.0, 150.0),
            ("Kitchen", 250.0, 150.0),
            ("Master Bedroom", 50.0, 250.0),
            ("Balcony1", 250.0, 250.0),
            ("Bedroom", 50.0, 350.0),
            ("Toilet2", 150.0, 350.0),
            ("Balcony2", 250.0, 350.0),
        ]
        .into_iter()
        .map(|(name, x, y)| (name.to_string(), Point { x, y }))
        .collect();

        Self { positions }
    }
}

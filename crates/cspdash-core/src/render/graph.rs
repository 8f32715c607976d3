#![forbid(unsafe_code)]

use serde::Serialize;

use super::{Edge, Tone};
use crate::scenario::{AnimationStep, DynamicValues};

const LAYOUT: [(u32, u16, u16); 4] = [(1, 50, 100), (2, 200, 100), (3, 350, 50), (4, 350, 150)];

const EDGES: [(u32, u32); 3] = [(1, 2), (2, 3), (2, 4)];

/// Label shown for a node with no recorded distance.
pub const UNREACHED: &str = "∞";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: u32,
    pub x: u16,
    pub y: u16,
    /// Only primary or neutral.
    pub tone: Tone,
    pub distance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
}

impl GraphView {
    pub fn node(&self, id: u32) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

pub(super) fn render(step: &AnimationStep, values: &DynamicValues) -> GraphView {
    GraphView {
        nodes: LAYOUT
            .iter()
            .map(|&(id, x, y)| GraphNode {
                id,
                x,
                y,
                tone: if step.is_primary(id) {
                    Tone::Primary
                } else {
                    Tone::Neutral
                },
                distance: values
                    .get(&id.to_string())
                    .map_or_else(|| UNREACHED.to_owned(), ToString::to_string),
            })
            .collect(),
        edges: EDGES.iter().map(|&(from, to)| Edge { from, to }).collect(),
    }
}

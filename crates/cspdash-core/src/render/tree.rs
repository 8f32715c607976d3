#![forbid(unsafe_code)]

use serde::Serialize;

use super::{Edge, Tone};
use crate::scenario::AnimationStep;

/// Complete binary tree of seven nodes on the 400x200 canvas.
const LAYOUT: [(u32, u16, u16); 7] = [
    (1, 200, 20),
    (2, 100, 80),
    (3, 300, 80),
    (4, 50, 150),
    (5, 150, 150),
    (6, 250, 150),
    (7, 350, 150),
];

const EDGES: [(u32, u32); 6] = [(1, 2), (1, 3), (2, 4), (2, 5), (3, 6), (3, 7)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: u32,
    pub x: u16,
    pub y: u16,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeView {
    pub nodes: Vec<TreeNode>,
    pub edges: Vec<Edge>,
}

impl TreeView {
    pub fn node(&self, id: u32) -> Option<&TreeNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

pub(super) fn render(step: &AnimationStep) -> TreeView {
    TreeView {
        nodes: LAYOUT
            .iter()
            .map(|&(id, x, y)| TreeNode {
                id,
                x,
                y,
                tone: Tone::classify(step, id),
            })
            .collect(),
        edges: EDGES.iter().map(|&(from, to)| Edge { from, to }).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CANVAS_HEIGHT, CANVAS_WIDTH};

    #[test]
    fn layout_is_fixed() {
        let view = render(&AnimationStep::new(0, "x"));
        assert_eq!(view.nodes.len(), 7);
        assert_eq!(view.edges.len(), 6);
        let root = view.node(1).unwrap();
        assert_eq!((root.x, root.y), (200, 20));
        assert!(view
            .nodes
            .iter()
            .all(|n| n.x <= CANVAS_WIDTH && n.y <= CANVAS_HEIGHT));
    }

    #[test]
    fn every_edge_joins_parent_to_child() {
        let view = render(&AnimationStep::new(0, "x"));
        for edge in &view.edges {
            assert_eq!(edge.to / 2, edge.from);
        }
    }

    #[test]
    fn highlights_color_nodes() {
        let step = AnimationStep::new(0, "x").highlight([2]).secondary([4, 5]);
        let view = render(&step);
        assert_eq!(view.node(2).unwrap().tone, Tone::Primary);
        assert_eq!(view.node(4).unwrap().tone, Tone::Secondary);
        assert_eq!(view.node(1).unwrap().tone, Tone::Neutral);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let view = render(&AnimationStep::new(0, "x").highlight([42]));
        assert!(view.nodes.iter().all(|n| n.tone == Tone::Neutral));
    }
}

#![forbid(unsafe_code)]

//! Renderer dispatch.
//!
//! Each [`ScenarioKind`] maps to exactly one [`RendererKind`]. Rendering is a
//! pure function of the scenario kind, the current step, the accumulated
//! dynamic values and the initial payload; it returns a serializable
//! [`Visual`] that front-ends paint however they like.
//!
//! Missing annotations (no pointers, no secondary highlights, no values) and
//! payloads of the wrong shape render as empty or unannotated layouts.

mod array;
mod graph;
mod matrix;
mod tree;

use serde::Serialize;

use crate::scenario::{AnimationStep, DynamicValues, InitialData, ScenarioKind};

pub use array::{ArrayCell, ArrayView};
pub use graph::{GraphNode, GraphView};
pub use matrix::{MatrixCell, MatrixView};
pub use tree::{TreeNode, TreeView};

/// Logical canvas used by the fixed tree and graph layouts.
pub const CANVAS_WIDTH: u16 = 400;
pub const CANVAS_HEIGHT: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    Array,
    Matrix,
    Tree,
    Graph,
}

impl ScenarioKind {
    pub fn renderer(self) -> RendererKind {
        match self {
            Self::Matrix | Self::Simulation => RendererKind::Matrix,
            Self::BinarySearch | Self::Knapsack | Self::Greedy | Self::String | Self::Math => {
                RendererKind::Array
            }
            Self::Tree => RendererKind::Tree,
            Self::Graph => RendererKind::Graph,
        }
    }
}

/// Visual emphasis of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Currently acted on.
    Primary,
    /// Being compared against.
    Secondary,
    Neutral,
    /// Search hit.
    Found,
}

impl Tone {
    /// Primary wins over secondary.
    pub fn classify(step: &AnimationStep, id: u32) -> Self {
        if step.is_primary(id) {
            Self::Primary
        } else if step.is_secondary(id) {
            Self::Secondary
        } else {
            Self::Neutral
        }
    }
}

/// An edge between two node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "renderer", rename_all = "snake_case")]
pub enum Visual {
    Array(ArrayView),
    Matrix(MatrixView),
    Tree(TreeView),
    Graph(GraphView),
}

impl Visual {
    pub fn renderer(&self) -> RendererKind {
        match self {
            Self::Array(_) => RendererKind::Array,
            Self::Matrix(_) => RendererKind::Matrix,
            Self::Tree(_) => RendererKind::Tree,
            Self::Graph(_) => RendererKind::Graph,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub kind: ScenarioKind,
    pub step: &'a AnimationStep,
    pub values: &'a DynamicValues,
    pub initial: &'a InitialData,
}

pub fn render(input: &RenderInput<'_>) -> Visual {
    match input.kind.renderer() {
        RendererKind::Array => Visual::Array(array::render(input)),
        RendererKind::Matrix => Visual::Matrix(matrix::render(input)),
        RendererKind::Tree => Visual::Tree(tree::render(input.step)),
        RendererKind::Graph => Visual::Graph(graph::render(input.step, input.values)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_renderer() {
        let expected = [
            (ScenarioKind::Matrix, RendererKind::Matrix),
            (ScenarioKind::Simulation, RendererKind::Matrix),
            (ScenarioKind::BinarySearch, RendererKind::Array),
            (ScenarioKind::Knapsack, RendererKind::Array),
            (ScenarioKind::Greedy, RendererKind::Array),
            (ScenarioKind::String, RendererKind::Array),
            (ScenarioKind::Math, RendererKind::Array),
            (ScenarioKind::Tree, RendererKind::Tree),
            (ScenarioKind::Graph, RendererKind::Graph),
        ];
        for (kind, renderer) in expected {
            assert_eq!(kind.renderer(), renderer, "{kind}");
        }
    }

    #[test]
    fn primary_beats_secondary() {
        let step = AnimationStep::new(0, "x").highlight([1]).secondary([1, 2]);
        assert_eq!(Tone::classify(&step, 1), Tone::Primary);
        assert_eq!(Tone::classify(&step, 2), Tone::Secondary);
        assert_eq!(Tone::classify(&step, 3), Tone::Neutral);
    }

    #[test]
    fn mismatched_payload_renders_empty() {
        let step = AnimationStep::new(0, "x").highlight([0]);
        let values = DynamicValues::new();
        let visual = render(&RenderInput {
            kind: ScenarioKind::Matrix,
            step: &step,
            values: &values,
            initial: &InitialData::Empty,
        });
        let Visual::Matrix(view) = visual else {
            panic!("matrix kind renders a matrix");
        };
        assert!(view.cells.is_empty());
        assert_eq!(view.columns, 0);
    }

    #[test]
    fn visual_serializes_with_renderer_tag() {
        let step = AnimationStep::new(0, "x");
        let values = DynamicValues::new();
        let visual = render(&RenderInput {
            kind: ScenarioKind::Tree,
            step: &step,
            values: &values,
            initial: &InitialData::Empty,
        });
        assert_eq!(visual.renderer(), RendererKind::Tree);
        let json = serde_json::to_value(&visual).unwrap();
        assert_eq!(json["renderer"], "tree");
    }
}

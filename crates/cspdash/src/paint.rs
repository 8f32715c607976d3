#![forbid(unsafe_code)]

//! Text painting for visualizer frames.
//!
//! Turns a [`Visual`] into lines of toned spans. The same lines feed the plain
//! `frames` output (tones become bracket markers) and the interactive player
//! (tones become colours).

use cspdash_core::code_panel::CodeLine;
use cspdash_core::render::{
    ArrayView, CANVAS_HEIGHT, CANVAS_WIDTH, Edge, GraphView, MatrixView, TreeView,
};
use cspdash_core::{Tone, Visual, VisualizerFrame};
use unicode_width::UnicodeWidthStr;

/// Canvas cell size in logical units.
const CELL_X: u16 = 10;
const CELL_Y: u16 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
}

impl Span {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Neutral)
    }
}

pub type Line = Vec<Span>;

/// Pad `text` to `width` terminal columns, centred.
pub fn center(text: &str, width: usize) -> String {
    let used = text.width();
    if used >= width {
        return text.to_owned();
    }
    let left = (width - used) / 2;
    let right = width - used - left;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

/// Pad `text` to `width` terminal columns, left-aligned.
pub fn pad(text: &str, width: usize) -> String {
    let used = text.width();
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

/// Marker pair used when tones cannot be coloured.
fn markers(tone: Tone) -> (&'static str, &'static str) {
    match tone {
        Tone::Primary => ("[", "]"),
        Tone::Secondary => ("(", ")"),
        Tone::Found => ("{", "}"),
        Tone::Neutral => (" ", " "),
    }
}

/// Flatten to plain text; toned spans are wrapped in markers.
pub fn to_plain(line: &[Span]) -> String {
    line.iter()
        .map(|span| {
            if span.tone == Tone::Neutral || span.text.trim().is_empty() {
                span.text.clone()
            } else {
                let (open, close) = markers(span.tone);
                format!("{open}{}{close}", span.text.trim())
            }
        })
        .collect::<String>()
        .trim_end()
        .to_owned()
}

pub fn paint_visual(visual: &Visual) -> Vec<Line> {
    match visual {
        Visual::Array(view) => paint_array(view),
        Visual::Matrix(view) => paint_matrix(view),
        Visual::Tree(view) => paint_tree(view),
        Visual::Graph(view) => paint_graph(view),
    }
}

fn paint_array(view: &ArrayView) -> Vec<Line> {
    if view.cells.is_empty() {
        return vec![vec![Span::plain("(no data)")]];
    }
    let width = view
        .cells
        .iter()
        .map(|cell| cell.display.to_string().width().max(cell.pointers.join(",").width()))
        .max()
        .unwrap_or(1)
        + 2;

    let values = view
        .cells
        .iter()
        .map(|cell| Span::new(center(&cell.display.to_string(), width), cell.tone))
        .collect();
    let indices = vec![Span::plain(
        view.cells
            .iter()
            .map(|cell| center(&cell.index.to_string(), width))
            .collect::<String>(),
    )];
    let pointers = vec![Span::plain(
        view.cells
            .iter()
            .map(|cell| center(&cell.pointers.join(","), width))
            .collect::<String>(),
    )];

    let mut lines = vec![values, indices, pointers];
    if let Some(caption) = &view.caption {
        lines.push(vec![Span::plain(caption.clone())]);
    }
    lines
}

fn paint_matrix(view: &MatrixView) -> Vec<Line> {
    if view.cells.is_empty() {
        return vec![vec![Span::plain("(no data)")]];
    }
    let label = |computed: Option<String>| computed.unwrap_or_else(|| "?".to_owned());
    let width = view
        .cells
        .iter()
        .map(|cell| {
            let value = label(cell.computed.as_ref().map(ToString::to_string)).width();
            let cost = format!("cost: {}", cell.cost).width();
            value.max(cost)
        })
        .max()
        .unwrap_or(1)
        + 2;

    let mut lines = Vec::with_capacity(view.rows() * 2);
    for row in view.cells.chunks(view.columns.max(1)) {
        lines.push(
            row.iter()
                .map(|cell| {
                    let value = label(cell.computed.as_ref().map(ToString::to_string));
                    Span::new(center(&value, width), cell.tone)
                })
                .collect(),
        );
        lines.push(vec![Span::plain(
            row.iter()
                .map(|cell| center(&format!("cost: {}", cell.cost), width))
                .collect::<String>(),
        )]);
    }
    lines
}

/// Character grid over the logical canvas.
struct Canvas {
    cells: Vec<Vec<(char, Tone)>>,
}

impl Canvas {
    fn new() -> Self {
        let columns = usize::from(CANVAS_WIDTH / CELL_X) + 1;
        let rows = usize::from(CANVAS_HEIGHT / CELL_Y) + 1;
        Self {
            cells: vec![vec![(' ', Tone::Neutral); columns]; rows],
        }
    }

    fn to_cell(x: u16, y: u16) -> (usize, usize) {
        (
            usize::from((x + CELL_X / 2) / CELL_X),
            usize::from((y + CELL_Y / 2) / CELL_Y),
        )
    }

    fn put(&mut self, col: usize, row: usize, ch: char, tone: Tone) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = (ch, tone);
        }
    }

    /// Write `text` centred on `col`, clipped at the edges.
    fn label(&mut self, col: usize, row: usize, text: &str, tone: Tone) {
        let start = col.saturating_sub(text.chars().count() / 2);
        for (offset, ch) in text.chars().enumerate() {
            self.put(start + offset, row, ch, tone);
        }
    }

    fn line(&mut self, from: (u16, u16), to: (u16, u16)) {
        let (c0, r0) = Self::to_cell(from.0, from.1);
        let (c1, r1) = Self::to_cell(to.0, to.1);
        let steps = c0.abs_diff(c1).max(r0.abs_diff(r1)).max(1);
        for i in 1..steps {
            let col = interpolate(c0, c1, i, steps);
            let row = interpolate(r0, r1, i, steps);
            self.put(col, row, '·', Tone::Neutral);
        }
    }

    fn into_lines(self) -> Vec<Line> {
        self.cells
            .into_iter()
            .map(|row| {
                let mut line: Line = Vec::new();
                for (ch, tone) in row {
                    match line.last_mut() {
                        Some(span) if span.tone == tone => span.text.push(ch),
                        _ => line.push(Span::new(ch.to_string(), tone)),
                    }
                }
                line
            })
            .collect()
    }
}

fn interpolate(a: usize, b: usize, i: usize, steps: usize) -> usize {
    if b >= a {
        a + (b - a) * i / steps
    } else {
        a - (a - b) * i / steps
    }
}

fn draw_edges(canvas: &mut Canvas, edges: &[Edge], position: impl Fn(u32) -> Option<(u16, u16)>) {
    for edge in edges {
        if let (Some(from), Some(to)) = (position(edge.from), position(edge.to)) {
            canvas.line(from, to);
        }
    }
}

fn paint_tree(view: &TreeView) -> Vec<Line> {
    let mut canvas = Canvas::new();
    draw_edges(&mut canvas, &view.edges, |id| view.node(id).map(|n| (n.x, n.y)));
    for node in &view.nodes {
        let (col, row) = Canvas::to_cell(node.x, node.y);
        canvas.label(col, row, &format!("({})", node.id), node.tone);
    }
    canvas.into_lines()
}

fn paint_graph(view: &GraphView) -> Vec<Line> {
    let mut canvas = Canvas::new();
    draw_edges(&mut canvas, &view.edges, |id| view.node(id).map(|n| (n.x, n.y)));
    for node in &view.nodes {
        let (col, row) = Canvas::to_cell(node.x, node.y);
        canvas.label(col, row, &format!("({})", node.id), node.tone);
        canvas.label(col, row.saturating_sub(1), &format!("Dist: {}", node.distance), Tone::Neutral);
    }
    canvas.into_lines()
}

pub fn paint_code(code: &[CodeLine]) -> Vec<Line> {
    code.iter()
        .map(|line| {
            let marker = if line.active { "▶" } else { " " };
            let tone = if line.active { Tone::Primary } else { Tone::Neutral };
            vec![
                Span::plain(format!("{marker} {:>2} ", line.number + 1)),
                Span::new(line.text.clone(), tone),
            ]
        })
        .collect()
}

/// Header, visual, description and code panel of one frame.
pub fn paint_frame(frame: &VisualizerFrame) -> Vec<Line> {
    let mut lines = vec![
        vec![Span::plain(format!(
            "{}  [{}]  step {}/{}  {}  {}",
            frame.title,
            frame.kind,
            frame.step_index + 1,
            frame.step_count,
            frame.state.label(),
            frame.speed
        ))],
        Vec::new(),
    ];
    lines.extend(paint_visual(&frame.visual));
    lines.push(Vec::new());
    lines.push(vec![Span::plain(format!("» {}", frame.description))]);
    lines.push(Vec::new());
    lines.extend(paint_code(&frame.code));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use cspdash_core::{EngineConfig, PlaybackEngine, ScenarioCatalog, VirtualTicker};

    fn frame(key: &str, steps: usize) -> VisualizerFrame {
        let mut engine = PlaybackEngine::with_scenario(
            Arc::new(ScenarioCatalog::builtin()),
            VirtualTicker::new(),
            EngineConfig::default(),
            key,
        );
        engine.seek(steps);
        engine.frame()
    }

    fn plain(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|line| to_plain(line)).collect()
    }

    #[test]
    fn center_uses_display_width() {
        assert_eq!(center("ab", 6), "  ab  ");
        assert_eq!(center("模拟", 6), " 模拟 ");
        assert_eq!(center("toolong", 3), "toolong");
        assert_eq!(pad("图", 4), "图  ");
    }

    #[test]
    fn array_marks_highlight_and_pointers() {
        let frame = frame("binary_search", 1);
        let text = plain(&paint_visual(&frame.visual));
        assert!(text[0].contains("[50]"));
        assert!(text[2].contains('M'));
        assert!(text[2].contains('L'));
    }

    #[test]
    fn matrix_shows_placeholder_and_costs() {
        let text = plain(&paint_visual(&frame("matrix", 1).visual));
        assert_eq!(text.len(), 6);
        assert!(text[2].contains("[7]"));
        assert!(text[2].contains('?'));
        assert!(text[3].contains("cost: 5"));
    }

    #[test]
    fn tree_places_every_node() {
        let text = plain(&paint_visual(&frame("tree", 0).visual)).join("\n");
        for id in 2..=7 {
            assert!(text.contains(&format!("({id})")), "node {id}");
        }
        assert!(text.contains("[(1)]"));
    }

    #[test]
    fn graph_labels_distances() {
        let text = plain(&paint_visual(&frame("graph", 0).visual)).join("\n");
        assert!(text.contains("Dist: 0"));
        assert!(text.contains("Dist: ∞"));
    }

    #[test]
    fn frame_marks_active_code_line() {
        let lines = paint_frame(&frame("binary_search", 1));
        let text = plain(&lines);
        assert!(text[0].contains("step 2/3"));
        let active: Vec<_> = text.iter().filter(|l| l.starts_with('▶')).collect();
        assert_eq!(active.len(), 1);
        assert!(active[0].contains("mid = (low + high) / 2"));
    }
}

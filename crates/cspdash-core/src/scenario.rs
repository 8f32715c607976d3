#![forbid(unsafe_code)]

//! Authored algorithm scenarios.
//!
//! A scenario is immutable data: pseudo-code lines, an initial payload for the
//! renderer, and an ordered, non-empty list of [`AnimationStep`]s. Nothing here
//! is computed; the engine replays it and the renderers annotate it.
//!
//! # Invariants
//!
//! 1. `steps` is never empty.
//! 2. Every step's `line_index` addresses a line in `code`.
//!
//! Both are checked with assertions at construction: a violation is an
//! authoring bug, not a runtime condition.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

/// A value displayed in a cell or node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Element identifier → displayed value.
pub type DynamicValues = BTreeMap<String, CellValue>;

/// Visualizer type keys known to the scenario catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    BinarySearch,
    Knapsack,
    Tree,
    Graph,
    Matrix,
    Greedy,
    Simulation,
    Math,
    String,
}

impl ScenarioKind {
    pub const ALL: [Self; 9] = [
        Self::BinarySearch,
        Self::Knapsack,
        Self::Tree,
        Self::Graph,
        Self::Matrix,
        Self::Greedy,
        Self::Simulation,
        Self::Math,
        Self::String,
    ];

    /// The key used by problem records to select this scenario.
    pub fn key(self) -> &'static str {
        match self {
            Self::BinarySearch => "binary_search",
            Self::Knapsack => "knapsack",
            Self::Tree => "tree",
            Self::Graph => "graph",
            Self::Matrix => "matrix",
            Self::Greedy => "greedy",
            Self::Simulation => "simulation",
            Self::Math => "math",
            Self::String => "string",
        }
    }

    /// Parse a visualizer key. Matching is exact; callers fall back on `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The 0/1 knapsack item shown under the DP array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnapsackItem {
    pub weight: i64,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ArrayData {
    pub items: Vec<CellValue>,
    /// Search target, when the scenario is a search.
    pub target: Option<i64>,
    pub item: Option<KnapsackItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GridData {
    /// Static cell costs, row-major.
    pub rows: Vec<Vec<i64>>,
}

/// Renderer-specific initial payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum InitialData {
    Array(ArrayData),
    Grid(GridData),
    #[default]
    Empty,
}

impl InitialData {
    pub fn numbers(items: impl IntoIterator<Item = i64>) -> Self {
        Self::Array(ArrayData {
            items: items.into_iter().map(CellValue::Int).collect(),
            ..ArrayData::default()
        })
    }

    pub fn grid(rows: Vec<Vec<i64>>) -> Self {
        Self::Grid(GridData { rows })
    }
}

/// One discrete snapshot of an algorithm's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimationStep {
    pub line_index: usize,
    pub description: String,
    pub highlights: BTreeSet<u32>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub secondary_highlights: BTreeSet<u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub active_pointers: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub values: DynamicValues,
}

impl AnimationStep {
    pub fn new(line_index: usize, description: impl Into<String>) -> Self {
        Self {
            line_index,
            description: description.into(),
            highlights: BTreeSet::new(),
            secondary_highlights: BTreeSet::new(),
            active_pointers: BTreeMap::new(),
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn highlight(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.highlights.extend(ids);
        self
    }

    #[must_use]
    pub fn secondary(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.secondary_highlights.extend(ids);
        self
    }

    #[must_use]
    pub fn pointer(mut self, name: impl Into<String>, index: usize) -> Self {
        self.active_pointers.insert(name.into(), index);
        self
    }

    #[must_use]
    pub fn value(mut self, id: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.values.insert(id.into(), value.into());
        self
    }

    pub fn is_primary(&self, id: u32) -> bool {
        self.highlights.contains(&id)
    }

    pub fn is_secondary(&self, id: u32) -> bool {
        self.secondary_highlights.contains(&id)
    }
}

/// An immutable, authored visualization of one algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmScenario {
    title: String,
    code: Vec<String>,
    initial_data: InitialData,
    steps: Vec<AnimationStep>,
}

impl AlgorithmScenario {
    /// # Panics
    ///
    /// Panics when `steps` is empty or a step points past the last code line.
    pub fn new(
        title: impl Into<String>,
        code: impl IntoIterator<Item = impl Into<String>>,
        initial_data: InitialData,
        steps: Vec<AnimationStep>,
    ) -> Self {
        let title = title.into();
        let code: Vec<String> = code.into_iter().map(Into::into).collect();
        assert!(!steps.is_empty(), "scenario `{title}` has no steps");
        for (index, step) in steps.iter().enumerate() {
            assert!(
                step.line_index < code.len(),
                "scenario `{title}` step {index} highlights line {} of {}",
                step.line_index,
                code.len()
            );
        }
        Self {
            title,
            code,
            initial_data,
            steps,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn code(&self) -> &[String] {
        &self.code
    }

    pub fn initial_data(&self) -> &InitialData {
        &self.initial_data
    }

    pub fn steps(&self) -> &[AnimationStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    /// The step at `index`, clamped into range.
    pub fn step(&self, index: usize) -> &AnimationStep {
        &self.steps[index.min(self.last_index())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_step(line: usize) -> Vec<AnimationStep> {
        vec![AnimationStep::new(line, "only")]
    }

    #[test]
    fn kind_keys_round_trip() {
        for kind in ScenarioKind::ALL {
            assert_eq!(ScenarioKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(ScenarioKind::from_key("Binary_Search"), None);
        assert_eq!(ScenarioKind::from_key(""), None);
    }

    #[test]
    fn step_builder_collects_annotations() {
        let step = AnimationStep::new(3, "Calculate DP state")
            .highlight([4])
            .secondary([1, 3])
            .pointer("i", 1)
            .value("1-1", 7);
        assert!(step.is_primary(4));
        assert!(step.is_secondary(3));
        assert!(!step.is_secondary(4));
        assert_eq!(step.active_pointers.get("i"), Some(&1));
        assert_eq!(step.values.get("1-1"), Some(&CellValue::Int(7)));
    }

    #[test]
    fn step_lookup_clamps() {
        let scenario = AlgorithmScenario::new(
            "t",
            ["a", "b"],
            InitialData::Empty,
            vec![AnimationStep::new(0, "x"), AnimationStep::new(1, "y")],
        );
        assert_eq!(scenario.step(0).description, "x");
        assert_eq!(scenario.step(99).description, "y");
        assert_eq!(scenario.last_index(), 1);
    }

    #[test]
    #[should_panic(expected = "has no steps")]
    fn empty_steps_are_rejected() {
        let _ = AlgorithmScenario::new("empty", ["line"], InitialData::Empty, Vec::new());
    }

    #[test]
    #[should_panic(expected = "highlights line 2 of 1")]
    fn out_of_range_line_is_rejected() {
        let _ = AlgorithmScenario::new("bad", ["line"], InitialData::Empty, one_step(2));
    }

    #[test]
    fn cell_values_display_plainly() {
        assert_eq!(CellValue::from(7).to_string(), "7");
        assert_eq!(CellValue::from("vis").to_string(), "vis");
        assert_eq!(serde_json::to_string(&CellValue::from(-3)).unwrap(), "-3");
        assert_eq!(serde_json::to_string(&CellValue::from("H")).unwrap(), "\"H\"");
    }
}

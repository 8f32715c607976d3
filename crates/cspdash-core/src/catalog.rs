#![forbid(unsafe_code)]

//! Scenario catalog: visualizer key → shared [`AlgorithmScenario`].
//!
//! Lookups never fail. An unknown key, or a known key the catalog does not
//! carry, resolves to the catalog's default scenario.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::scenario::{
    AlgorithmScenario, AnimationStep, ArrayData, CellValue, InitialData, KnapsackItem,
    ScenarioKind,
};

/// Key used when a lookup misses.
pub const DEFAULT_SCENARIO: ScenarioKind = ScenarioKind::BinarySearch;

/// Result of resolving a visualizer key.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub kind: ScenarioKind,
    pub scenario: Arc<AlgorithmScenario>,
    /// `true` when the requested key was not served directly.
    pub fell_back: bool,
}

#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: BTreeMap<ScenarioKind, Arc<AlgorithmScenario>>,
    default_kind: ScenarioKind,
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScenarioCatalog {
    /// # Panics
    ///
    /// Panics when `default_kind` has no scenario in `scenarios`.
    pub fn new(
        default_kind: ScenarioKind,
        scenarios: impl IntoIterator<Item = (ScenarioKind, AlgorithmScenario)>,
    ) -> Self {
        let scenarios: BTreeMap<_, _> = scenarios
            .into_iter()
            .map(|(kind, scenario)| (kind, Arc::new(scenario)))
            .collect();
        assert!(
            scenarios.contains_key(&default_kind),
            "default scenario `{default_kind}` is missing from the catalog"
        );
        Self {
            scenarios,
            default_kind,
        }
    }

    /// The nine scenarios shipped with the dashboard.
    pub fn builtin() -> Self {
        Self::new(
            DEFAULT_SCENARIO,
            ScenarioKind::ALL.map(|kind| (kind, builtin_scenario(kind))),
        )
    }

    pub fn default_kind(&self) -> ScenarioKind {
        self.default_kind
    }

    /// Use a different fallback. Ignored when `kind` is not in the catalog.
    #[must_use]
    pub fn with_default(mut self, kind: ScenarioKind) -> Self {
        if self.scenarios.contains_key(&kind) {
            self.default_kind = kind;
        }
        self
    }

    pub fn get(&self, kind: ScenarioKind) -> Option<&Arc<AlgorithmScenario>> {
        self.scenarios.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ScenarioKind> + '_ {
        self.scenarios.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Resolve a visualizer key, falling back to the default scenario.
    pub fn resolve(&self, key: &str) -> Resolved {
        let direct = ScenarioKind::from_key(key)
            .and_then(|kind| self.scenarios.get(&kind).map(|scenario| (kind, scenario)));
        if let Some((kind, scenario)) = direct {
            return Resolved {
                kind,
                scenario: Arc::clone(scenario),
                fell_back: false,
            };
        }
        tracing::warn!(
            requested = key,
            fallback = %self.default_kind,
            "unknown scenario key, using default"
        );
        Resolved {
            kind: self.default_kind,
            scenario: Arc::clone(&self.scenarios[&self.default_kind]),
            fell_back: true,
        }
    }
}

const GRID_COSTS: [[i64; 3]; 3] = [[1, 3, 1], [1, 5, 1], [4, 2, 1]];

fn cost_grid() -> InitialData {
    InitialData::grid(GRID_COSTS.iter().map(|row| row.to_vec()).collect())
}

fn step(line: usize, description: &str) -> AnimationStep {
    AnimationStep::new(line, description)
}

fn builtin_scenario(kind: ScenarioKind) -> AlgorithmScenario {
    match kind {
        ScenarioKind::Matrix => AlgorithmScenario::new(
            "Grid / Matrix DP Visualization",
            [
                "// dp[i][j] = min path sum to (i,j)",
                "for i from 0 to 2:",
                "  for j from 0 to 2:",
                "    dp[i][j] = min(up, left) + cost",
                "    // update cell value",
            ],
            cost_grid(),
            vec![
                step(1, "Start Grid Traversal"),
                step(3, "Calculate DP state")
                    .highlight([4])
                    .secondary([1, 3])
                    .value("1-1", 7),
                step(3, "Finished").highlight([8]),
            ],
        ),
        ScenarioKind::Knapsack => AlgorithmScenario::new(
            "0/1 Knapsack / Linear DP",
            [
                "// dp[j] = max value at capacity j",
                "for item in items:",
                "  for j from W down to w[i]:",
                "    dp[j] = max(dp[j], dp[j-w] + v)",
                "    // update array",
            ],
            InitialData::Array(ArrayData {
                items: vec![CellValue::Int(0); 9],
                target: None,
                item: Some(KnapsackItem {
                    weight: 3,
                    value: 4,
                }),
            }),
            vec![
                step(0, "Init DP Array"),
                step(3, "Update index 8")
                    .highlight([8])
                    .secondary([5])
                    .value("8", 4),
                step(3, "Update index 7")
                    .highlight([7])
                    .secondary([4])
                    .value("7", 4),
            ],
        ),
        ScenarioKind::Tree => AlgorithmScenario::new(
            "Tree Traversal / Recursion",
            [
                "function dfs(u):",
                "  visited[u] = true",
                "  for v in children[u]:",
                "    dfs(v)",
                "  return",
            ],
            InitialData::Empty,
            vec![
                step(0, "Start DFS(1)").highlight([1]),
                step(1, "Visit 1").highlight([1]).value("1", "vis"),
                step(3, "Go to child 2").highlight([2]).secondary([1]),
                step(1, "Visit 2").highlight([2]).value("2", "vis"),
            ],
        ),
        ScenarioKind::BinarySearch => AlgorithmScenario::new(
            "Binary Search",
            [
                "low = 0, high = n-1",
                "while low <= high:",
                "  mid = (low + high) / 2",
                "  if arr[mid] < target: low = mid + 1",
                "  else: high = mid - 1",
            ],
            InitialData::Array(ArrayData {
                items: (1..=9).map(|n| CellValue::Int(n * 10)).collect(),
                target: Some(70),
                item: None,
            }),
            vec![
                step(0, "Init pointers").pointer("low", 0).pointer("high", 8),
                step(2, "Check mid")
                    .highlight([4])
                    .pointer("low", 0)
                    .pointer("high", 8)
                    .pointer("mid", 4),
                step(3, "50 < 70, go right")
                    .pointer("low", 5)
                    .pointer("high", 8),
            ],
        ),
        ScenarioKind::Greedy => {
            let sorted = (0..9).fold(step(1, "Sort the array first").highlight(0..9), |s, i| {
                s.value(i.to_string(), i + 1)
            });
            AlgorithmScenario::new(
                "Greedy Strategy (Sorting/Selection)",
                [
                    "// Sort items by criteria",
                    "items.sort()",
                    "for item in items:",
                    "  if check(item):",
                    "    take(item)",
                ],
                InitialData::numbers([5, 2, 8, 1, 9, 3, 7, 4, 6]),
                vec![
                    sorted,
                    step(3, "Check item 1").highlight([0]).pointer("i", 0),
                    step(4, "Take item 1").highlight([0]),
                    step(3, "Check item 2").highlight([1]).pointer("i", 1),
                ],
            )
        }
        ScenarioKind::String => AlgorithmScenario::new(
            "String Processing / Matching",
            [
                "// Iterate string characters",
                "for i from 0 to len-1:",
                "  char = s[i]",
                "  // process char",
                "  update_state()",
            ],
            InitialData::Array(ArrayData {
                items: "Hello CSP".chars().map(|c| CellValue::Text(c.to_string())).collect(),
                ..ArrayData::default()
            }),
            vec![
                step(1, "Start scanning").highlight([0]).pointer("i", 0),
                step(3, "Process 'H'").highlight([0]),
                step(1, "Next char").highlight([1]).pointer("i", 1),
                step(3, "Process 'e'").highlight([1]),
            ],
        ),
        ScenarioKind::Simulation => AlgorithmScenario::new(
            "Simulation Logic",
            [
                "// Simulate process step by step",
                "while condition:",
                "  update_state()",
                "  check_boundary()",
                "  time++",
            ],
            cost_grid(),
            vec![
                step(1, "Check condition"),
                step(2, "Update cell (1,1)").highlight([4]).value("1-1", 9),
                step(3, "Check boundaries"),
            ],
        ),
        ScenarioKind::Math => AlgorithmScenario::new(
            "Mathematical Computation",
            [
                "// Calculate formula",
                "result = 0",
                "for i from 1 to n:",
                "  term = calculate(i)",
                "  result += term",
            ],
            InitialData::numbers([1, 1, 2, 3, 5, 8, 13, 21, 34]),
            vec![
                step(2, "Calculate term 1").highlight([0]).pointer("i", 0),
                step(4, "Add to result").highlight([0]),
                step(2, "Calculate term 2").highlight([1]).pointer("i", 1),
            ],
        ),
        ScenarioKind::Graph => AlgorithmScenario::new(
            "Graph Traversal (BFS/Shortest Path)",
            [
                "queue.push(start)",
                "while queue not empty:",
                "  u = queue.pop()",
                "  for v in adj[u]:",
                "    relax(u, v)",
            ],
            InitialData::Empty,
            vec![
                step(0, "Start Node 1").highlight([1]).value("1", 0),
                step(2, "Pop 1").highlight([1]),
                step(4, "Visit neighbors")
                    .highlight([2, 3])
                    .secondary([1])
                    .value("2", 1)
                    .value("3", 1),
            ],
        ),
    }
}

#![forbid(unsafe_code)]

//! Four-stage study plan.

use serde::{Deserialize, Serialize};

use crate::error::Result;

const EMBEDDED_PLAN: &str = include_str!("../data/plan.json");

/// Stage the learner is currently working through.
pub const DEFAULT_CURRENT_STAGE: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStage {
    pub week_range: String,
    pub title: String,
    pub description: String,
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Done,
    Current,
    Upcoming,
}

impl StageState {
    pub fn of(index: usize, current: usize) -> Self {
        match index.cmp(&current) {
            std::cmp::Ordering::Less => Self::Done,
            std::cmp::Ordering::Equal => Self::Current,
            std::cmp::Ordering::Greater => Self::Upcoming,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::Done => "✓",
            Self::Current => "▶",
            Self::Upcoming => "·",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyPlan {
    stages: Vec<PlanStage>,
    current: usize,
}

impl StudyPlan {
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_PLAN)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let stages: Vec<PlanStage> = serde_json::from_str(s)?;
        Ok(Self {
            current: DEFAULT_CURRENT_STAGE.min(stages.len().saturating_sub(1)),
            stages,
        })
    }

    /// Clamped to the last stage.
    #[must_use]
    pub fn with_current(mut self, current: usize) -> Self {
        self.current = current.min(self.stages.len().saturating_sub(1));
        self
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn stages(&self) -> &[PlanStage] {
        &self.stages
    }

    pub fn states(&self) -> impl Iterator<Item = (&PlanStage, StageState)> + '_ {
        self.stages
            .iter()
            .enumerate()
            .map(|(index, stage)| (stage, StageState::of(index, self.current)))
    }
}

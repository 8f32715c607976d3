#![forbid(unsafe_code)]

//! Per-problem study progress.
//!
//! The store is owned by the caller and passed by reference; every mutation
//! goes through [`ProgressStore::set_status`]. Unknown ids read as
//! [`ProblemStatus::Incomplete`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DashError, Result};
use crate::problem::{Problem, Tier};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemStatus {
    Completed,
    #[default]
    Incomplete,
    Flagged,
}

impl ProblemStatus {
    pub const ALL: [Self; 3] = [Self::Completed, Self::Incomplete, Self::Flagged];

    pub fn key(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Flagged => "flagged",
        }
    }

    pub fn label_cn(self) -> &'static str {
        match self {
            Self::Completed => "已完成",
            Self::Incomplete => "未完成",
            Self::Flagged => "有疑问",
        }
    }
}

impl fmt::Display for ProblemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProblemStatus {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashError::invalid(format!("unknown status '{s}'")))
    }
}

/// In-memory status table for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProgressStore {
    statuses: BTreeMap<String, ProblemStatus>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, id: &str) -> ProblemStatus {
        self.statuses.get(id).copied().unwrap_or_default()
    }

    /// Returns the previous status.
    pub fn set_status(&mut self, id: impl Into<String>, status: ProblemStatus) -> ProblemStatus {
        let id = id.into();
        let previous = self.statuses.insert(id.clone(), status).unwrap_or_default();
        if previous != status {
            tracing::debug!(%id, from = %previous, to = %status, "problem status changed");
        }
        previous
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Per-tier breakdown over `problems`, one entry per tier in order.
    pub fn tier_breakdown<'a>(
        &self,
        problems: impl IntoIterator<Item = &'a Problem>,
    ) -> Vec<TierProgress> {
        let mut rows: Vec<TierProgress> = Tier::ALL.into_iter().map(TierProgress::empty).collect();
        for problem in problems {
            let Some(row) = rows.iter_mut().find(|row| row.tier == problem.tier) else {
                continue;
            };
            row.total += 1;
            match self.status(&problem.id) {
                ProblemStatus::Completed => row.completed += 1,
                ProblemStatus::Flagged => row.flagged += 1,
                ProblemStatus::Incomplete => row.incomplete += 1,
            }
        }
        rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierProgress {
    pub tier: Tier,
    pub completed: usize,
    pub flagged: usize,
    pub incomplete: usize,
    pub total: usize,
}

impl TierProgress {
    fn empty(tier: Tier) -> Self {
        Self {
            tier,
            completed: 0,
            flagged: 0,
            incomplete: 0,
            total: 0,
        }
    }

    /// Completed share in `[0, 1]`; zero for an empty tier.
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemCatalog;

    #[test]
    fn unknown_ids_are_incomplete() {
        let store = ProgressStore::new();
        assert_eq!(store.status("P1001"), ProblemStatus::Incomplete);
    }

    #[test]
    fn set_status_returns_previous() {
        let mut store = ProgressStore::new();
        assert_eq!(store.set_status("P1", ProblemStatus::Flagged), ProblemStatus::Incomplete);
        assert_eq!(store.set_status("P1", ProblemStatus::Completed), ProblemStatus::Flagged);
        assert_eq!(store.status("P1"), ProblemStatus::Completed);
    }

    #[test]
    fn breakdown_counts_every_problem_once() {
        let catalog = ProblemCatalog::embedded().unwrap();
        let mut store = ProgressStore::new();
        let first_t1 = catalog.in_tier(Tier::T1).next().unwrap().id.clone();
        store.set_status(first_t1, ProblemStatus::Completed);

        let rows = store.tier_breakdown(catalog.problems());
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.iter().map(|r| r.total).sum::<usize>(), catalog.len());
        for row in &rows {
            assert_eq!(row.completed + row.flagged + row.incomplete, row.total);
        }
        assert!(rows[0].completed >= 1);
        assert!(rows[0].completion_ratio() > 0.0);
    }

    #[test]
    fn store_serializes_as_id_map() {
        let mut store = ProgressStore::new();
        store.set_status("P1090", ProblemStatus::Flagged);
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json, serde_json::json!({ "P1090": "flagged" }));
    }

    #[test]
    fn parse_status() {
        assert_eq!("Completed".parse::<ProblemStatus>().unwrap(), ProblemStatus::Completed);
        assert!("done".parse::<ProblemStatus>().is_err());
        assert_eq!(ProblemStatus::Flagged.label_cn(), "有疑问");
    }
}

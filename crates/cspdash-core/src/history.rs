#![forbid(unsafe_code)]

//! Past exam papers and the topics they covered.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::problem::{TagCount, Tier, tag_frequency};

const EMBEDDED_HISTORY: &str = include_str!("../data/history.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamProblem {
    pub name: String,
    pub tier: Tier,
    /// Free-form topic labels; broader than the bank's tag set.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamYear {
    pub year: u16,
    pub problems: Vec<ExamProblem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamHistory {
    years: Vec<ExamYear>,
}

impl ExamHistory {
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_HISTORY)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(Self {
            years: serde_json::from_str(s)?,
        })
    }

    pub fn years(&self) -> &[ExamYear] {
        &self.years
    }

    /// Topic frequency over every paper, most frequent first.
    pub fn tag_frequency(&self) -> Vec<TagCount<&str>> {
        tag_frequency(
            self.years
                .iter()
                .flat_map(|year| &year.problems)
                .flat_map(|problem| problem.tags.iter().map(String::as_str)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_history_covers_seven_years() {
        let history = ExamHistory::embedded().unwrap();
        let years: Vec<u16> = history.years().iter().map(|y| y.year).collect();
        assert_eq!(years, (2019..=2025).collect::<Vec<_>>());
        assert!(history.years().iter().all(|y| y.problems.len() == 4));
    }

    #[test]
    fn frequency_is_sorted() {
        let history = ExamHistory::embedded().unwrap();
        let counts = history.tag_frequency();
        assert!(counts.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!((counts[0].tag, counts[0].count), ("贪心", 6));
        assert_eq!((counts[1].tag, counts[1].count), ("动态规划", 6));
        let total: usize = counts.iter().map(|c| c.count).sum();
        let expected: usize = history
            .years()
            .iter()
            .flat_map(|y| &y.problems)
            .map(|p| p.tags.len())
            .sum();
        assert_eq!(total, expected);
    }
}

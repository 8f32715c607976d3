#![forbid(unsafe_code)]

use serde::Serialize;

use super::{RenderInput, Tone};
use crate::scenario::{CellValue, InitialData};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    pub row: usize,
    pub col: usize,
    /// Row-major flat index used for highlight membership.
    pub index: usize,
    /// Static cost from the initial grid.
    pub cost: i64,
    /// Accumulated value written under the `"row-col"` key.
    pub computed: Option<CellValue>,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixView {
    pub columns: usize,
    /// Row-major.
    pub cells: Vec<MatrixCell>,
}

impl MatrixView {
    pub fn cell(&self, row: usize, col: usize) -> Option<&MatrixCell> {
        if col >= self.columns {
            return None;
        }
        self.cells.get(row * self.columns + col)
    }

    pub fn rows(&self) -> usize {
        self.cells.len().checked_div(self.columns).unwrap_or(0)
    }
}

pub fn cell_key(row: usize, col: usize) -> String {
    format!("{row}-{col}")
}

pub(super) fn render(input: &RenderInput<'_>) -> MatrixView {
    let InitialData::Grid(grid) = input.initial else {
        return MatrixView {
            columns: 0,
            cells: Vec::new(),
        };
    };
    let columns = grid.rows.first().map_or(0, Vec::len);

    let cells = grid
        .rows
        .iter()
        .enumerate()
        .flat_map(|(row, costs)| {
            // Ragged rows are cut to the first row's width.
            costs
                .iter()
                .take(columns)
                .enumerate()
                .map(move |(col, &cost)| (row, col, cost))
        })
        .map(|(row, col, cost)| {
            let index = row * columns + col;
            let tone = u32::try_from(index).map_or(Tone::Neutral, |id| Tone::classify(input.step, id));
            MatrixCell {
                row,
                col,
                index,
                cost,
                computed: input.values.get(&cell_key(row, col)).cloned(),
                tone,
            }
        })
        .collect();

    MatrixView { columns, cells }
}

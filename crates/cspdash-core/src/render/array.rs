#![forbid(unsafe_code)]

use serde::Serialize;

use super::{RenderInput, Tone};
use crate::scenario::{AnimationStep, CellValue, InitialData};

/// Pointer names with a dedicated short label, in display order.
const NAMED_POINTERS: [(&str, &str); 5] = [
    ("low", "L"),
    ("high", "H"),
    ("mid", "M"),
    ("i", "i"),
    ("j", "j"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayCell {
    pub index: usize,
    pub display: CellValue,
    /// `true` when `display` comes from the accumulated values.
    pub overridden: bool,
    pub tone: Tone,
    /// Labels of every pointer on this index.
    pub pointers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayView {
    pub cells: Vec<ArrayCell>,
    /// Extra context shown under the array (the knapsack item).
    pub caption: Option<String>,
}

pub(super) fn render(input: &RenderInput<'_>) -> ArrayView {
    let InitialData::Array(data) = input.initial else {
        return ArrayView {
            cells: Vec::new(),
            caption: None,
        };
    };
    let step = input.step;
    let mid = step.active_pointers.get("mid").copied();

    let cells = data
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let dynamic = input.values.get(&index.to_string());
            let display = dynamic.unwrap_or(item).clone();
            let found = data
                .target
                .is_some_and(|target| mid == Some(index) && display == CellValue::Int(target));
            let tone = if found {
                Tone::Found
            } else {
                u32::try_from(index).map_or(Tone::Neutral, |id| Tone::classify(step, id))
            };
            ArrayCell {
                index,
                display,
                overridden: dynamic.is_some(),
                tone,
                pointers: pointer_labels(step, index),
            }
        })
        .collect();

    let caption = data
        .item
        .map(|item| format!("Current item: weight={}, value={}", item.weight, item.value));

    ArrayView { cells, caption }
}

fn pointer_labels(step: &AnimationStep, index: usize) -> Vec<String> {
    let mut named: Vec<(usize, String)> = step
        .active_pointers
        .iter()
        .filter(|&(_, &at)| at == index)
        .map(|(name, _)| {
            NAMED_POINTERS
                .iter()
                .position(|(known, _)| known == name)
                .map_or((NAMED_POINTERS.len(), name.clone()), |rank| {
                    (rank, NAMED_POINTERS[rank].1.to_owned())
                })
        })
        .collect();
    // BTreeMap iteration already sorts unknown names alphabetically.
    named.sort_by_key(|(rank, _)| *rank);
    named.into_iter().map(|(_, label)| label).collect()
}

#![forbid(unsafe_code)]

//! Pseudo-code panel: marks the line the current step is executing.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeLine {
    /// Zero-based line number.
    pub number: usize,
    pub text: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CodePanel<'a> {
    code: &'a [String],
    active: usize,
}

impl<'a> CodePanel<'a> {
    pub fn new(code: &'a [String], active: usize) -> Self {
        Self { code, active }
    }

    /// The active line, or `None` when the index is past the end.
    pub fn active_line(&self) -> Option<&'a str> {
        self.code.get(self.active).map(String::as_str)
    }

    pub fn lines(&self) -> Vec<CodeLine> {
        self.code
            .iter()
            .enumerate()
            .map(|(number, text)| CodeLine {
                number,
                text: text.clone(),
                active: number == self.active,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> Vec<String> {
        ["a", "b", "c"].map(String::from).to_vec()
    }

    #[test]
    fn exactly_one_line_is_active() {
        let code = code();
        let lines = CodePanel::new(&code, 1).lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().filter(|l| l.active).count(), 1);
        assert!(lines[1].active);
        assert_eq!(lines[1].text, "b");
    }

    #[test]
    fn out_of_range_index_marks_nothing() {
        let code = code();
        let panel = CodePanel::new(&code, 7);
        assert_eq!(panel.active_line(), None);
        assert!(panel.lines().iter().all(|l| !l.active));
    }

    #[test]
    fn active_line_text() {
        let code = code();
        assert_eq!(CodePanel::new(&code, 2).active_line(), Some("c"));
    }
}

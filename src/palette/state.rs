//! The palette's query/filter/selection state. Pure and synchronous; the
//! async shell in `palette::PaletteUi` feeds it keystrokes and publishes
//! its output.

use crate::domain::models::{PaletteMode, ResultItem};

#[derive(Debug, Default)]
pub struct QueryState {
    pub mode: PaletteMode,
    candidates: Vec<ResultItem>,
    pub query: String,
    /// Indices into `candidates`, in candidate order.
    filtered: Vec<usize>,
    /// Index into `filtered`. `None` until the user navigates; Enter then
    /// activates the first row.
    pub selected: Option<usize>,
}

impl QueryState {
    /// Installs a fresh candidate set, dropping the query and selection.
    /// Every open and every mode switch goes through here.
    pub fn reset(&mut self, mode: PaletteMode, candidates: Vec<ResultItem>) {
        self.mode = mode;
        self.candidates = candidates;
        self.query.clear();
        self.apply_filter();
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.apply_filter();
    }

    pub fn backspace(&mut self) {
        self.query.pop();
        self.apply_filter();
    }

    /// Any query edit recomputes matches and clears the selection, so stale
    /// arrow positions never survive a filter change.
    fn apply_filter(&mut self) {
        let needle = self.query.to_lowercase();
        self.filtered = self
            .candidates
            .iter()
            .enumerate()
            .filter(|(_, item)| item.matches(&needle))
            .map(|(index, _)| index)
            .collect();
        self.selected = None;
    }

    pub fn select_next(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(index) if index + 1 < self.filtered.len() => index + 1,
            Some(_) => 0,
            None => 0,
        });
    }

    pub fn select_prev(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => self.filtered.len() - 1,
            Some(index) => index - 1,
        });
    }

    /// What Enter activates: the selected row, or the first match when the
    /// user never arrowed.
    pub fn activation_target(&self) -> Option<&ResultItem> {
        let position = self.selected.unwrap_or(0);
        let index = *self.filtered.get(position)?;
        self.candidates.get(index)
    }

    pub fn matches(&self) -> impl Iterator<Item = &ResultItem> {
        self.filtered.iter().filter_map(|&index| self.candidates.get(index))
    }

    pub fn match_count(&self) -> usize {
        self.filtered.len()
    }
}

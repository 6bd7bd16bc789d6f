use crate::models::{CanonicalItem, PairKey, Severity};
use crate::session::{display_order, CacheEntry, RefreshCoordinator, SelectionSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Diagonal,
    Loading,
    NotChecked,
    NoInteraction,
    Interaction(Severity),
    Failed,
}

impl CellState {
    pub fn label(&self) -> &'static str {
        match self {
            CellState::Diagonal => "-",
            CellState::Loading => "loading",
            CellState::NotChecked => "not checked",
            CellState::NoInteraction => "no known interaction",
            CellState::Interaction(severity) => severity.as_str(),
            CellState::Failed => "lookup failed",
        }
    }

    /// Whether clicking the cell opens a detail view.
    pub fn has_detail(&self) -> bool {
        matches!(self, CellState::Interaction(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixCell {
    /// `None` on the diagonal.
    pub key: Option<PairKey>,
    pub state: CellState,
}

/// Square matrix over the selection, axes in display order.
#[derive(Debug, Clone)]
pub struct MatrixView {
    pub axis: Vec<CanonicalItem>,
    pub rows: Vec<Vec<MatrixCell>>,
}

impl MatrixView {
    pub fn build(selection: &SelectionSet, coordinator: &RefreshCoordinator) -> Self {
        let axis: Vec<CanonicalItem> = display_order(selection.items())
            .into_iter()
            .cloned()
            .collect();

        let rows = axis
            .iter()
            .map(|row_item| {
                axis.iter()
                    .map(|col_item| {
                        if row_item.id == col_item.id {
                            return MatrixCell {
                                key: None,
                                state: CellState::Diagonal,
                            };
                        }
                        let key = PairKey::new(&row_item.id, &col_item.id);
                        let state = cell_state(&key, coordinator);
                        MatrixCell {
                            key: Some(key),
                            state,
                        }
                    })
                    .collect()
            })
            .collect();

        Self { axis, rows }
    }

    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&MatrixCell> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    /// State of the pair's cells; both halves of the matrix agree.
    pub fn state_of(&self, key: &PairKey) -> Option<CellState> {
        self.off_diagonal()
            .find(|cell| cell.key.as_ref() == Some(key))
            .map(|cell| cell.state)
    }

    pub fn off_diagonal(&self) -> impl Iterator<Item = &MatrixCell> {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| cell.state != CellState::Diagonal)
    }

    /// Fixed-width text rendering, one row per selected item.
    pub fn render_text(&self) -> String {
        if self.axis.is_empty() {
            return "No items selected.\n".to_string();
        }

        let label_width = self
            .axis
            .iter()
            .map(|item| item.display.chars().count())
            .max()
            .unwrap_or(0);
        let col_widths: Vec<usize> = (0..self.axis.len())
            .map(|col| {
                let header = self.axis[col].display.chars().count();
                self.rows
                    .iter()
                    .map(|row| row[col].state.label().len())
                    .chain(std::iter::once(header))
                    .max()
                    .unwrap_or(header)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&pad("", label_width));
        for (item, width) in self.axis.iter().zip(&col_widths) {
            out.push_str(" | ");
            out.push_str(&pad(&item.display, *width));
        }
        out.push('\n');

        for (item, row) in self.axis.iter().zip(&self.rows) {
            out.push_str(&pad(&item.display, label_width));
            for (cell, width) in row.iter().zip(&col_widths) {
                out.push_str(" | ");
                out.push_str(&pad(cell.state.label(), *width));
            }
            out.push('\n');
        }

        out
    }
}

fn cell_state(key: &PairKey, coordinator: &RefreshCoordinator) -> CellState {
    match coordinator.cache().get(key) {
        Some(CacheEntry::Found(record)) => CellState::Interaction(record.severity),
        Some(CacheEntry::NoInteraction) => CellState::NoInteraction,
        Some(CacheEntry::LookupFailed(_)) => CellState::Failed,
        None if coordinator.is_loading(key) => CellState::Loading,
        None => CellState::NotChecked,
    }
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

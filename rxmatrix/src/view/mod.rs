//! Presentation models for the chip list, interaction matrix and detail panel.

mod detail;
mod matrix;

pub use detail::DetailView;
pub use matrix::{CellState, MatrixCell, MatrixView};

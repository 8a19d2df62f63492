//! Session table feature slice.

pub mod columns;
pub mod reconcile;
mod render;
pub mod row;
pub mod selection;
mod state;
mod update;

pub use reconcile::{KeyedRow, ReconcileReport, RowOp, reconcile};
pub use render::{render_column_header, render_rows, state_color};
pub use row::SessionRow;
pub use selection::{CellPoint, TableSelection};
pub use state::TableState;
pub use update::{handle_key, handle_mouse};

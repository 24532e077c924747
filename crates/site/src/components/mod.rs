//! Reusable view components for dashboard templates.

pub mod data_table;

pub use data_table::{DataTable, TableRow};

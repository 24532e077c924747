//! Data table component types.
//!
//! The dashboard list page renders any [`Editable`] table through these.

use crate::forms::Editable;

/// One row of a data table, with its action links.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<String>,
    pub edit_url: String,
    pub delete_url: String,
}

/// Configuration and rows of a data table.
#[derive(Debug, Clone)]
pub struct DataTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<TableRow>,
    /// URL of the "new row" form, absent for read-only tables.
    pub new_url: Option<String>,
    /// Message shown when there are no rows.
    pub empty_message: String,
}

impl DataTable {
    /// Build the table for a list of records. Rows without an id are skipped.
    #[must_use]
    pub fn for_records<T: Editable>(records: &[T]) -> Self {
        let base = format!("/dashboard/{}", T::KIND);
        let rows = records
            .iter()
            .filter_map(|record| {
                let id = record.id()?.to_string();
                Some(TableRow {
                    edit_url: format!("{base}/{id}"),
                    delete_url: format!("{base}/{id}/delete"),
                    cells: record.cells(),
                    id,
                })
            })
            .collect();
        Self {
            columns: T::columns(),
            rows,
            new_url: Some(format!("{base}/new")),
            empty_message: format!("No {} yet.", T::LABEL.to_lowercase()),
        }
    }

    /// A table without actions.
    #[must_use]
    pub fn read_only(columns: Vec<&'static str>, cells: Vec<Vec<String>>, empty: &str) -> Self {
        Self {
            columns,
            rows: cells
                .into_iter()
                .enumerate()
                .map(|(i, cells)| TableRow {
                    id: i.to_string(),
                    cells,
                    edit_url: String::new(),
                    delete_url: String::new(),
                })
                .collect(),
            new_url: None,
            empty_message: empty.to_string(),
        }
    }

    /// Whether rows link to edit and delete actions.
    #[must_use]
    pub const fn has_actions(&self) -> bool {
        self.new_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use forgepilot_core::{Faq, RowId};

    use super::*;

    #[test]
    fn test_rows_link_to_actions() {
        let id = RowId::random();
        let faq = Faq {
            id: Some(id),
            question: "Why?".into(),
            answer: "Because.".into(),
            position: 1,
        };
        let table = DataTable::for_records(&[faq, Faq::default()]);

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].edit_url, format!("/dashboard/faqs/{id}"));
        assert_eq!(table.rows[0].delete_url, format!("/dashboard/faqs/{id}/delete"));
        assert_eq!(table.new_url.as_deref(), Some("/dashboard/faqs/new"));
        assert!(table.has_actions());
    }

    #[test]
    fn test_read_only_has_no_actions() {
        let table = DataTable::read_only(vec!["Name"], vec![vec!["Dana".into()]], "None");
        assert!(!table.has_actions());
        assert_eq!(table.rows[0].cells, vec!["Dana"]);
    }
}

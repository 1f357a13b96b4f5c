//! Result pages handed from the reader to the presentation host

use crate::error::PagerError;

/// Column metadata. `type_name` is informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_name: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// One display row, a string per column
pub type Row = Vec<String>;

/// A bounded batch of formatted rows. Every row has exactly one cell per
/// column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Row>,
}

impl Page {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a row. Rows with the wrong number of cells are rejected and
    /// handed back.
    pub fn push_row(&mut self, row: Row) -> Result<(), Row> {
        if row.len() != self.columns.len() {
            return Err(row);
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Vec<ColumnDescriptor>, Vec<Row>) {
        (self.columns, self.rows)
    }
}

/// Outcome of a single page fetch.
///
/// A failed fetch and a genuine end of data both produce zero rows; keeping
/// them apart lets the controller report failures instead of treating them
/// as the end of the table.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// At least one row came back
    Rows(Page),
    /// The query succeeded but returned nothing
    EndOfData(Vec<ColumnDescriptor>),
    /// Opening the connection or running the query failed
    Failed(PagerError),
}

impl PageOutcome {
    /// Collapse into a plain page. Failures become an empty page.
    pub fn into_page(self) -> Page {
        match self {
            PageOutcome::Rows(page) => page,
            PageOutcome::EndOfData(columns) => Page::new(columns),
            PageOutcome::Failed(_) => Page::empty(),
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            PageOutcome::Rows(page) => page.row_count(),
            _ => 0,
        }
    }
}

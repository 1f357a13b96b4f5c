use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::controller::PageSink;
use crate::error::PagerError;
use crate::page::{ColumnDescriptor, Row};

/// Terminal presentation host. Keeps every rendered row, like a list store
/// behind a scrolled view, and prints each appended batch.
pub struct TerminalTable {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Row>,
    echo: bool,
    notices: Vec<String>,
}

impl TerminalTable {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            echo: true,
            notices: Vec::new(),
        }
    }

    /// A table that records but prints nothing
    pub fn quiet() -> Self {
        Self {
            echo: false,
            ..Self::new()
        }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Messages shown to the user, oldest first
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Render rows `start..` as a table with numbered rows
    pub fn render_from(&self, start: usize) -> String {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);

        let mut headers = vec![Cell::new("#").add_attribute(Attribute::Dim)];
        headers.extend(
            self.columns
                .iter()
                .map(|c| Cell::new(&c.name).add_attribute(Attribute::Bold)),
        );
        table.set_header(headers);

        for (idx, row) in self.rows.iter().enumerate().skip(start) {
            let mut cells = vec![Cell::new(idx + 1)];
            cells.extend(row.iter().map(Cell::new));
            table.add_row(cells);
        }

        table.to_string()
    }

    fn notice(&mut self, message: String) {
        if self.echo {
            println!("{}", message);
        }
        self.notices.push(message);
    }
}

impl Default for TerminalTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSink for TerminalTable {
    fn clear(&mut self) {
        self.columns.clear();
        self.rows.clear();
    }

    fn set_columns(&mut self, columns: &[ColumnDescriptor]) {
        self.columns = columns.to_vec();
    }

    fn append_rows(&mut self, rows: &[Row]) {
        let start = self.rows.len();
        self.rows.extend_from_slice(rows);
        if self.echo {
            println!("{}", self.render_from(start));
            println!(
                "{}",
                format!("{} rows shown ({} new)", self.rows.len(), rows.len()).green()
            );
        }
    }

    fn no_data(&mut self, reason: Option<&PagerError>) {
        let message = match reason {
            Some(e) => format!("Error database connection or no data: {}", e),
            None => "Error database connection or no data.".to_string(),
        };
        self.notice(message.red().to_string());
    }

    fn load_failed(&mut self, error: &PagerError) {
        self.notice(format!("Could not load more rows: {}", error).yellow().to_string());
    }
}

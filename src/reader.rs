//! Paged reads from a single table
//!
//! The reader probes the table once when it is built and caches the column
//! names and the runtime types of the first row. Each page fetch then opens
//! its own connection, runs one bounded SELECT, formats every cell and closes
//! the connection again before returning.
//!
//! The cached schema and the columns of a fetched page are kept apart on
//! purpose: a narrowed selection returns fewer columns than the probe saw.

use tracing::{debug, error, warn};

use crate::error::PagerResult;
use crate::formatter::ValueFormatter;
use crate::page::{ColumnDescriptor, Page, PageOutcome};
use crate::provider::{ConnectionProvider, RawValue, ResultSet, ScopedConnection};
use crate::query::{build_schema_probe, build_select, SELECT_ALL};

pub struct PagedTableReader<P: ConnectionProvider> {
    provider: P,
    formatter: ValueFormatter,
    selection: String,
    order_by: String,
    column_names: Vec<String>,
    column_types: Vec<String>,
}

impl<P: ConnectionProvider> PagedTableReader<P> {
    /// Build a reader with the default formatting rules and probe `table_name`
    pub fn new(provider: P, table_name: &str) -> Self {
        Self::with_formatter(provider, table_name, ValueFormatter::default())
    }

    /// Build a reader and probe `table_name`. A failed probe leaves the cached
    /// schema empty; the failure shows up again on the first page fetch.
    pub fn with_formatter(provider: P, table_name: &str, formatter: ValueFormatter) -> Self {
        let mut reader = Self {
            provider,
            formatter,
            selection: SELECT_ALL.to_string(),
            order_by: String::new(),
            column_names: Vec::new(),
            column_types: Vec::new(),
        };
        reader.probe_schema(table_name);
        reader
    }

    fn probe_schema(&mut self, table_name: &str) {
        let sql = build_schema_probe(table_name);
        match self.run_select(&sql) {
            Ok(result) => {
                self.column_names = result.columns.iter().map(|c| c.name.clone()).collect();
                // Types come from the first row's values, so an empty table
                // yields names without types.
                self.column_types = result
                    .rows
                    .first()
                    .map(|row| row.iter().map(|v| v.type_name().to_string()).collect())
                    .unwrap_or_default();
                debug!(
                    target: "reader",
                    "Probed {}: {} columns, {} types",
                    table_name,
                    self.column_names.len(),
                    self.column_types.len()
                );
            }
            Err(e) => {
                error!(target: "reader", "Error reading schema of {}: {}", table_name, e);
            }
        }
    }

    /// Column names seen by the construction-time probe
    pub fn cached_column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Runtime type names of the probed first row, in column order
    pub fn cached_column_types(&self) -> &[String] {
        &self.column_types
    }

    /// Selection clause for subsequent fetches
    pub fn set_column_selection(&mut self, selection: impl Into<String>) {
        self.selection = selection.into();
    }

    /// Order-by clause for subsequent fetches; empty means natural order
    pub fn set_order_by(&mut self, order_by: impl Into<String>) {
        self.order_by = order_by.into();
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn order_by(&self) -> &str {
        &self.order_by
    }

    pub fn formatter(&self) -> &ValueFormatter {
        &self.formatter
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch one page. Failures are logged and come back as an empty page.
    pub fn get_page(&self, table_name: &str, limit: usize, offset: usize) -> Page {
        self.fetch_page(table_name, limit, offset).into_page()
    }

    /// Fetch one page and say whether it holds rows, marks the end of the
    /// data, or failed.
    pub fn fetch_page(&self, table_name: &str, limit: usize, offset: usize) -> PageOutcome {
        let sql = build_select(table_name, &self.selection, &self.order_by, limit, offset);
        let result = match self.run_select(&sql) {
            Ok(result) => result,
            Err(e) => {
                error!(target: "reader", "Error getting data from {}: {}", table_name, e);
                return PageOutcome::Failed(e);
            }
        };

        let page = self.format_result(result);
        debug!(
            target: "reader",
            "Fetched {} rows from {} at offset {}",
            page.row_count(),
            table_name,
            offset
        );
        if page.is_empty() {
            PageOutcome::EndOfData(page.into_parts().0)
        } else {
            PageOutcome::Rows(page)
        }
    }

    fn run_select(&self, sql: &str) -> PagerResult<ResultSet> {
        let mut conn = ScopedConnection::open(&self.provider)?;
        crate::trace_query!(sql);
        let result = conn.execute_select(sql);
        if let Err(e) = conn.close() {
            warn!(target: "reader", "{}", e);
        }
        result
    }

    fn format_result(&self, result: ResultSet) -> Page {
        let columns: Vec<ColumnDescriptor> = result
            .columns
            .iter()
            .map(|c| {
                ColumnDescriptor::new(c.name.clone(), c.declared_type.clone().unwrap_or_default())
            })
            .collect();

        let mut page = Page::new(columns);
        for raw_row in &result.rows {
            let row: Vec<String> = page
                .columns()
                .iter()
                .enumerate()
                .map(|(idx, column)| {
                    let text = raw_row.get(idx).and_then(RawValue::to_text);
                    self.formatter.format(&column.name, text.as_deref())
                })
                .collect();
            if let Err(row) = page.push_row(row) {
                warn!(target: "reader", "Dropping malformed row with {} cells", row.len());
            }
        }
        page
    }
}

//! SELECT statement assembly for paged reads
//!
//! Table names and clauses are pasted into the statement verbatim. Nothing
//! here escapes or validates them, so callers must only pass fixed,
//! developer-controlled strings (an allow-listed table name, preset column
//! lists and ORDER BY fragments). Never feed user input through this module.

/// Default selection clause
pub const SELECT_ALL: &str = "*";

/// Default rows per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Build `SELECT <selection> FROM <table> [<order_by>] LIMIT <limit> OFFSET <offset>`.
/// An empty order-by clause is left out entirely.
pub fn build_select(
    table_name: &str,
    selection: &str,
    order_by: &str,
    limit: usize,
    offset: usize,
) -> String {
    let mut sql = format!("SELECT {} FROM {}", selection, table_name);
    if !order_by.is_empty() {
        sql.push(' ');
        sql.push_str(order_by);
    }
    sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
    sql
}

/// Single-row probe used to discover a table's columns
pub fn build_schema_probe(table_name: &str) -> String {
    format!("SELECT * FROM {} LIMIT 1", table_name)
}

/// Query parameters for one browsing session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub selection: String,
    pub order_by: String,
    pub page_size: usize,
    pub offset: usize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            selection: SELECT_ALL.to_string(),
            order_by: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl QuerySpec {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }
}

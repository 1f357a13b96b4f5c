//! Scroll-driven pagination
//!
//! The controller owns the browsing session for one table: which columns are
//! selected, how rows are ordered, how many rows have been handed to the
//! presentation host so far, and whether the end of the data was reached.
//!
//! Phases:
//!
//! ```text
//!   Initial --rows--> Loaded --rows--> Loaded
//!      |                 |
//!      | empty/failed    | empty
//!      v                 v
//!    Empty           Exhausted
//! ```
//!
//! `Empty` and `Exhausted` are terminal until the session is reset or
//! reconfigured. Every fetch runs to completion (rows appended, offset
//! advanced) before the call returns, so requests never overlap.

use tracing::{debug, info, warn};

use crate::error::PagerError;
use crate::page::{ColumnDescriptor, PageOutcome, Row};
use crate::provider::ConnectionProvider;
use crate::query::QuerySpec;
use crate::reader::PagedTableReader;

/// Receives what the controller decides to show
pub trait PageSink {
    /// Drop all rendered rows and columns
    fn clear(&mut self);

    /// Set up columns for a fresh session
    fn set_columns(&mut self, columns: &[ColumnDescriptor]);

    /// Append rows below the ones already rendered
    fn append_rows(&mut self, rows: &[Row]);

    /// The initial load produced nothing. `reason` is set when the fetch
    /// failed rather than finding an empty table.
    fn no_data(&mut self, reason: Option<&PagerError>);

    /// An incremental load failed. Rendered rows stay as they are.
    fn load_failed(&mut self, _error: &PagerError) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing loaded yet
    Initial,
    /// Rows are shown and more may follow
    Loaded,
    /// The last incremental load returned no rows
    Exhausted,
    /// The initial load returned no rows
    Empty,
}

/// Snapshot of the scroll bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub offset: usize,
    pub end_of_data: bool,
    pub initial_load_completed: bool,
}

impl ScrollState {
    pub fn phase(&self) -> LoadPhase {
        match (self.initial_load_completed, self.end_of_data, self.offset) {
            (false, _, _) => LoadPhase::Initial,
            (true, false, _) => LoadPhase::Loaded,
            (true, true, 0) => LoadPhase::Empty,
            (true, true, _) => LoadPhase::Exhausted,
        }
    }
}

/// What a load request did
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    /// Rows were handed to the sink and the offset moved to `offset`
    Appended { rows: usize, offset: usize },
    /// The initial load found nothing to show
    NoData,
    /// An incremental load found the end of the data
    Exhausted,
    /// An incremental load failed; state is unchanged
    Failed(PagerError),
    /// Nothing was fetched in the current phase
    Skipped,
}

pub struct ScrollController<P: ConnectionProvider, S: PageSink> {
    reader: PagedTableReader<P>,
    sink: S,
    table_name: String,
    query: QuerySpec,
    end_of_data: bool,
    initial_load_completed: bool,
}

impl<P: ConnectionProvider, S: PageSink> ScrollController<P, S> {
    /// `page_size` must be positive; zero is bumped to one.
    pub fn new(
        reader: PagedTableReader<P>,
        sink: S,
        table_name: impl Into<String>,
        page_size: usize,
    ) -> Self {
        let mut query = QuerySpec::new(page_size.max(1));
        query.selection = reader.selection().to_string();
        query.order_by = reader.order_by().to_string();
        Self {
            reader,
            sink,
            table_name: table_name.into(),
            query,
            end_of_data: false,
            initial_load_completed: false,
        }
    }

    pub fn state(&self) -> ScrollState {
        ScrollState {
            offset: self.query.offset,
            end_of_data: self.end_of_data,
            initial_load_completed: self.initial_load_completed,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.state().phase()
    }

    pub fn offset(&self) -> usize {
        self.query.offset
    }

    pub fn query(&self) -> &QuerySpec {
        &self.query
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn reader(&self) -> &PagedTableReader<P> {
        &self.reader
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// First fetch of a session. Only acts in the `Initial` phase.
    pub fn initial_load(&mut self) -> LoadEvent {
        if self.phase() != LoadPhase::Initial {
            debug!(target: "controller", "Initial load skipped in {:?}", self.phase());
            return LoadEvent::Skipped;
        }

        let outcome = self.fetch();
        self.initial_load_completed = true;

        match outcome {
            PageOutcome::Rows(page) => {
                let (columns, rows) = page.into_parts();
                self.sink.set_columns(&columns);
                self.append(rows)
            }
            PageOutcome::EndOfData(_) => {
                info!(target: "controller", "No data in {}", self.table_name);
                self.end_of_data = true;
                self.sink.no_data(None);
                LoadEvent::NoData
            }
            PageOutcome::Failed(e) => {
                warn!(target: "controller", "Initial load of {} failed: {}", self.table_name, e);
                self.end_of_data = true;
                self.sink.no_data(Some(&e));
                LoadEvent::NoData
            }
        }
    }

    /// Fetch the next page after the rendered rows. Only acts in the `Loaded`
    /// phase; in any other phase it is a no-op.
    pub fn incremental_load(&mut self) -> LoadEvent {
        if self.phase() != LoadPhase::Loaded {
            debug!(target: "controller", "Incremental load skipped in {:?}", self.phase());
            return LoadEvent::Skipped;
        }

        match self.fetch() {
            PageOutcome::Rows(page) => {
                let (_, rows) = page.into_parts();
                self.append(rows)
            }
            PageOutcome::EndOfData(_) => {
                info!(
                    target: "controller",
                    "No more data to load from {} after {} rows",
                    self.table_name,
                    self.query.offset
                );
                self.end_of_data = true;
                LoadEvent::Exhausted
            }
            PageOutcome::Failed(e) => {
                warn!(
                    target: "controller",
                    "Loading more rows from {} at offset {} failed: {}",
                    self.table_name,
                    self.query.offset,
                    e
                );
                self.sink.load_failed(&e);
                LoadEvent::Failed(e)
            }
        }
    }

    /// Discard everything rendered and go back to `Initial`
    pub fn reset(&mut self) {
        self.sink.clear();
        self.query.offset = 0;
        self.end_of_data = false;
        self.initial_load_completed = false;
    }

    /// Reset and run a fresh initial load with the current configuration
    pub fn reload(&mut self) -> LoadEvent {
        self.reset();
        self.initial_load()
    }

    /// Switch selection and ordering, then start over
    pub fn reconfigure_and_reload(
        &mut self,
        selection: impl Into<String>,
        order_by: impl Into<String>,
    ) -> LoadEvent {
        self.query.selection = selection.into();
        self.query.order_by = order_by.into();
        self.reader.set_column_selection(self.query.selection.clone());
        self.reader.set_order_by(self.query.order_by.clone());
        info!(
            target: "controller",
            "Reconfigured: SELECT {} / {:?}",
            self.query.selection,
            self.query.order_by
        );
        self.reload()
    }

    fn fetch(&self) -> PageOutcome {
        self.reader
            .fetch_page(&self.table_name, self.query.page_size, self.query.offset)
    }

    /// Hand rows to the sink and advance by the number actually returned
    fn append(&mut self, rows: Vec<Row>) -> LoadEvent {
        self.sink.append_rows(&rows);
        self.query.offset += rows.len();
        debug!(
            target: "controller",
            "Appended {} rows, offset now {}",
            rows.len(),
            self.query.offset
        );
        LoadEvent::Appended {
            rows: rows.len(),
            offset: self.query.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PagerResult;
    use crate::provider::{Connection, RawValue, ResultColumn, ResultSet};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// In-memory table that answers `... LIMIT n OFFSET m` statements
    struct MemoryTable {
        rows: usize,
        fetches: Rc<RefCell<Vec<(usize, usize)>>>,
        fail: Rc<Cell<bool>>,
    }

    struct MemoryConnection {
        rows: usize,
        fetches: Rc<RefCell<Vec<(usize, usize)>>>,
        fail: bool,
    }

    fn parse_bounds(sql: &str) -> Option<(usize, usize)> {
        let words: Vec<&str> = sql.split_whitespace().collect();
        let limit = words.iter().position(|w| *w == "LIMIT")?;
        let limit_value = words.get(limit + 1)?.parse().ok()?;
        let offset_value = match words.iter().position(|w| *w == "OFFSET") {
            Some(pos) => words.get(pos + 1)?.parse().ok()?,
            None => 0,
        };
        Some((limit_value, offset_value))
    }

    impl Connection for MemoryConnection {
        fn execute_select(&mut self, sql: &str) -> PagerResult<ResultSet> {
            if self.fail {
                return Err(PagerError::query(sql, "disk I/O error"));
            }
            let (limit, offset) =
                parse_bounds(sql).ok_or_else(|| PagerError::query(sql, "no bounds"))?;
            self.fetches.borrow_mut().push((limit, offset));

            let end = (offset + limit).min(self.rows);
            let rows = (offset.min(end)..end)
                .map(|i| vec![RawValue::Integer(i as i64 + 1), RawValue::Real(i as f64)])
                .collect();
            Ok(ResultSet {
                columns: vec![
                    ResultColumn::new("id", Some("INTEGER".into())),
                    ResultColumn::new("amount", Some("REAL".into())),
                ],
                rows,
            })
        }

        fn close(self: Box<Self>) -> PagerResult<()> {
            Ok(())
        }
    }

    impl ConnectionProvider for MemoryTable {
        fn name(&self) -> &str {
            "memory"
        }

        fn open(&self) -> PagerResult<Box<dyn Connection>> {
            Ok(Box::new(MemoryConnection {
                rows: self.rows,
                fetches: self.fetches.clone(),
                fail: self.fail.get(),
            }))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        columns: Vec<String>,
        rows: Vec<Row>,
        clears: usize,
        no_data: Vec<Option<PagerError>>,
        failures: usize,
    }

    impl PageSink for RecordingSink {
        fn clear(&mut self) {
            self.clears += 1;
            self.columns.clear();
            self.rows.clear();
        }

        fn set_columns(&mut self, columns: &[ColumnDescriptor]) {
            self.columns = columns.iter().map(|c| c.name.clone()).collect();
        }

        fn append_rows(&mut self, rows: &[Row]) {
            self.rows.extend_from_slice(rows);
        }

        fn no_data(&mut self, reason: Option<&PagerError>) {
            self.no_data.push(reason.cloned());
        }

        fn load_failed(&mut self, _error: &PagerError) {
            self.failures += 1;
        }
    }

    struct Fixture {
        controller: ScrollController<MemoryTable, RecordingSink>,
        fetches: Rc<RefCell<Vec<(usize, usize)>>>,
        fail: Rc<Cell<bool>>,
    }

    fn fixture(rows: usize, page_size: usize) -> Fixture {
        let fetches = Rc::new(RefCell::new(Vec::new()));
        let fail = Rc::new(Cell::new(false));
        let table = MemoryTable {
            rows,
            fetches: fetches.clone(),
            fail: fail.clone(),
        };
        let reader = PagedTableReader::new(table, "items");
        // Drop the schema probe from the fetch log
        fetches.borrow_mut().clear();
        Fixture {
            controller: ScrollController::new(reader, RecordingSink::default(), "items", page_size),
            fetches,
            fail,
        }
    }

    #[test]
    fn test_pages_through_whole_table() {
        let mut f = fixture(1000, 50);
        assert_eq!(f.controller.phase(), LoadPhase::Initial);

        assert_eq!(
            f.controller.initial_load(),
            LoadEvent::Appended { rows: 50, offset: 50 }
        );
        assert_eq!(f.controller.sink().columns, vec!["id", "amount"]);

        while f.controller.phase() == LoadPhase::Loaded {
            f.controller.incremental_load();
        }
        assert_eq!(f.controller.phase(), LoadPhase::Exhausted);
        assert_eq!(f.controller.offset(), 1000);
        assert_eq!(f.controller.sink().rows.len(), 1000);
        assert_eq!(f.controller.sink().rows[999], vec!["1000", "999.00"]);

        let offsets: Vec<usize> = f.fetches.borrow().iter().map(|(_, o)| *o).collect();
        let mut expected: Vec<usize> = (0..20).map(|i| i * 50).collect();
        expected.push(1000);
        assert_eq!(offsets, expected);

        // Further requests neither fetch nor move
        for _ in 0..3 {
            assert_eq!(f.controller.incremental_load(), LoadEvent::Skipped);
        }
        assert_eq!(f.fetches.borrow().len(), 21);
        assert_eq!(f.controller.offset(), 1000);
    }

    #[test]
    fn test_short_last_page_advances_by_rows_returned() {
        let mut f = fixture(120, 50);
        f.controller.initial_load();
        assert_eq!(
            f.controller.incremental_load(),
            LoadEvent::Appended { rows: 50, offset: 100 }
        );
        assert_eq!(
            f.controller.incremental_load(),
            LoadEvent::Appended { rows: 20, offset: 120 }
        );
        assert_eq!(f.controller.incremental_load(), LoadEvent::Exhausted);
        assert!(f.controller.state().end_of_data);
        assert_eq!(f.controller.offset(), 120);
    }

    #[test]
    fn test_empty_table_reports_no_data_once() {
        let mut f = fixture(0, 50);
        assert_eq!(f.controller.initial_load(), LoadEvent::NoData);
        assert_eq!(f.controller.phase(), LoadPhase::Empty);
        assert_eq!(f.controller.sink().no_data, vec![None]);

        assert_eq!(f.controller.initial_load(), LoadEvent::Skipped);
        assert_eq!(f.controller.incremental_load(), LoadEvent::Skipped);
        assert_eq!(f.controller.sink().no_data.len(), 1);
        assert_eq!(f.fetches.borrow().len(), 1);
    }

    #[test]
    fn test_initial_failure_reports_reason() {
        let mut f = fixture(10, 5);
        f.fail.set(true);
        assert_eq!(f.controller.initial_load(), LoadEvent::NoData);
        assert_eq!(f.controller.phase(), LoadPhase::Empty);
        assert!(matches!(
            f.controller.sink().no_data.as_slice(),
            [Some(PagerError::QueryExecution { .. })]
        ));
    }

    #[test]
    fn test_incremental_failure_keeps_state() {
        let mut f = fixture(10, 5);
        f.controller.initial_load();
        f.fail.set(true);

        assert!(matches!(
            f.controller.incremental_load(),
            LoadEvent::Failed(_)
        ));
        assert_eq!(f.controller.phase(), LoadPhase::Loaded);
        assert_eq!(f.controller.offset(), 5);
        assert_eq!(f.controller.sink().failures, 1);

        f.fail.set(false);
        assert_eq!(
            f.controller.incremental_load(),
            LoadEvent::Appended { rows: 5, offset: 10 }
        );
    }

    #[test]
    fn test_reconfigure_resets_session() {
        let mut f = fixture(100, 50);
        f.controller.initial_load();
        f.controller.incremental_load();
        f.controller.incremental_load();
        assert_eq!(f.controller.phase(), LoadPhase::Exhausted);

        f.fetches.borrow_mut().clear();
        let event = f.controller.reconfigure_and_reload("id", "ORDER BY id DESC");
        assert_eq!(event, LoadEvent::Appended { rows: 50, offset: 50 });
        assert_eq!(f.controller.phase(), LoadPhase::Loaded);
        assert_eq!(f.controller.sink().clears, 1);
        assert_eq!(f.controller.sink().rows.len(), 50);
        assert_eq!(f.controller.query().selection, "id");
        assert_eq!(f.controller.reader().order_by(), "ORDER BY id DESC");
        assert_eq!(*f.fetches.borrow(), vec![(50, 0)]);
    }

    #[test]
    fn test_zero_page_size_is_bumped() {
        let f = fixture(3, 0);
        assert_eq!(f.controller.query().page_size, 1);
    }

    #[test]
    fn test_phase_from_state() {
        let state = |offset, end_of_data, initial_load_completed| ScrollState {
            offset,
            end_of_data,
            initial_load_completed,
        };
        assert_eq!(state(0, false, false).phase(), LoadPhase::Initial);
        assert_eq!(state(50, false, true).phase(), LoadPhase::Loaded);
        assert_eq!(state(0, true, true).phase(), LoadPhase::Empty);
        assert_eq!(state(50, true, true).phase(), LoadPhase::Exhausted);
    }
}

pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod page;
pub mod provider;
pub mod query;
pub mod reader;
pub mod schema;
pub mod seed;
pub mod sqlite;

pub use controller::{LoadEvent, LoadPhase, PageSink, ScrollController, ScrollState};
pub use error::{PagerError, PagerResult};
pub use formatter::ValueFormatter;
pub use page::{ColumnDescriptor, Page, PageOutcome, Row};
pub use reader::PagedTableReader;

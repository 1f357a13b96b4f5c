//! Demo table bootstrap
//!
//! Creates the `data_types` table when it does not exist and fills it with
//! 1000 generated rows. A table that already holds rows is left alone.

use chrono::NaiveDate;
use rusqlite::params;
use tracing::{error, info};

use crate::error::{PagerError, PagerResult};

pub const SEED_ROWS: usize = 1000;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS data_types (\
    id INTEGER PRIMARY KEY, \
    name TEXT, \
    amount REAL, \
    creation_date TIMESTAMP, \
    creation_time TIME\
)";

const INSERT_SQL: &str = "INSERT INTO data_types (id, name, amount, creation_date, creation_time) \
     VALUES (?1, ?2, ?3, ?4, ?5)";

/// One generated demo row
#[derive(Debug, Clone, PartialEq)]
pub struct SeedRow {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub creation_date: String,
    pub creation_time: String,
}

impl SeedRow {
    /// Row `i` of the demo data, `i` starting at 1
    pub fn generate(i: usize) -> Self {
        let month = (i % 12) as u32 + 1;
        let day = (i % 28) as u32 + 1;
        let hour = (i % 24) as u32;
        let minute = (i % 60) as u32;
        let second = (i % 60) as u32;

        // Day never exceeds 28 and the clock fields stay in range, so every
        // combination is a valid timestamp.
        let timestamp = NaiveDate::from_ymd_opt(2023, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second));
        let (creation_date, creation_time) = match timestamp {
            Some(ts) => (
                ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                ts.format("%H:%M:%S").to_string(),
            ),
            None => (String::new(), String::new()),
        };

        Self {
            id: i as i64,
            name: format!("Item {}", i),
            amount: 100.0 + i as f64 * 0.5,
            creation_date,
            creation_time,
        }
    }
}

/// Result of a seeding run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The table already had rows
    AlreadyPresent(usize),
    /// This many rows were inserted
    Inserted(usize),
}

/// Create `data_types` and fill it unless it already has rows. Stops at
/// the first failing insert.
pub fn ensure_seed_data(conn: &rusqlite::Connection) -> PagerResult<SeedOutcome> {
    let seed_err = |e: rusqlite::Error| PagerError::Seed {
        reason: e.to_string(),
    };

    conn.execute(CREATE_TABLE_SQL, []).map_err(seed_err)?;

    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM data_types", [], |row| row.get(0))
        .map_err(seed_err)?;
    if existing > 0 {
        info!(target: "seed", "Data already exists ({} rows), skipping insert", existing);
        return Ok(SeedOutcome::AlreadyPresent(existing as usize));
    }

    let mut stmt = conn.prepare(INSERT_SQL).map_err(seed_err)?;
    for i in 1..=SEED_ROWS {
        let row = SeedRow::generate(i);
        if let Err(e) = stmt.execute(params![
            row.id,
            row.name,
            row.amount,
            row.creation_date,
            row.creation_time
        ]) {
            error!(target: "seed", "Error inserting row {}: {}", i, e);
            return Err(seed_err(e));
        }
    }

    info!(target: "seed", "Inserted {} rows into data_types", SEED_ROWS);
    Ok(SeedOutcome::Inserted(SEED_ROWS))
}

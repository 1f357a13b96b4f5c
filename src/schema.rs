//! Schema report built from the reader's cached probe

use std::fmt;

/// Name/type pairs of the probed table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaReport {
    Columns(Vec<(String, String)>),
    /// Names and types could not be paired up
    Mismatch { names: usize, types: usize },
}

impl SchemaReport {
    pub fn new(names: &[String], types: &[String]) -> Self {
        if names.len() != types.len() {
            return SchemaReport::Mismatch {
                names: names.len(),
                types: types.len(),
            };
        }
        SchemaReport::Columns(
            names
                .iter()
                .cloned()
                .zip(types.iter().cloned())
                .collect(),
        )
    }

    pub fn is_consistent(&self) -> bool {
        matches!(self, SchemaReport::Columns(_))
    }
}

impl fmt::Display for SchemaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaReport::Columns(columns) => {
                for (name, type_name) in columns {
                    writeln!(f, "Column name: {} | Type: {}", name, type_name)?;
                }
                Ok(())
            }
            SchemaReport::Mismatch { names, types } => writeln!(
                f,
                "Error: count of column names ({}) and column types ({}) not equal",
                names, types
            ),
        }
    }
}

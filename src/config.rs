use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::query::DEFAULT_PAGE_SIZE;
use crate::sqlite::SQLITE_PROVIDER;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub paging: PagingConfig,
    pub formatting: FormattingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Provider name, currently only "SQLite"
    pub provider: String,

    /// Provider connection string. When unset the database `users` in the
    /// current directory is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    /// Table to browse
    pub table: String,

    /// Create and fill the demo table on start when it is empty
    pub seed_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Rows fetched per page
    pub page_size: usize,

    /// ORDER BY clause applied at start
    pub default_order_by: String,

    /// Column list shown by the "preset columns" command
    pub preset_selection: String,

    /// ORDER BY clause used by the "order by date" command
    pub date_order_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    /// Column holding monetary amounts
    pub amount_column: String,

    /// Fractional digits for amounts
    pub decimal_places: usize,

    /// Column holding display names, stripped of surrounding quotes
    pub name_column: String,

    /// Column holding creation timestamps, cut to the date
    pub date_column: String,
    pub date_length: usize,

    /// Column holding creation times, cut to HH:MM:SS
    pub time_column: String,
    pub time_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    pub level: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: SQLITE_PROVIDER.to_string(),
            connection_string: None,
            table: "data_types".to_string(),
            seed_on_start: true,
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            default_order_by: "ORDER BY id".to_string(),
            preset_selection: "id, name, amount".to_string(),
            date_order_by: "ORDER BY creation_date DESC".to_string(),
        }
    }
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            amount_column: "amount".to_string(),
            decimal_places: 2,
            name_column: "name".to_string(),
            date_column: "creation_date".to_string(),
            date_length: 10,
            time_column: "creation_time".to_string(),
            time_length: 8,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Configured connection string, or `DB_DIR=<cwd>;DB_NAME=users`
    pub fn resolved_connection_string(&self) -> Result<String> {
        match &self.connection_string {
            Some(conn) => Ok(conn.clone()),
            None => {
                let cwd = std::env::current_dir()?;
                Ok(format!("DB_DIR={};DB_NAME=users", cwd.display()))
            }
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        if self.paging.page_size == 0 {
            warn!(
                "page_size must be positive, using {}",
                DEFAULT_PAGE_SIZE
            );
            self.paging.page_size = DEFAULT_PAGE_SIZE;
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("table-pager").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Table Pager Configuration File
# Location: ~/.config/table-pager/config.toml (Linux)
#           %APPDATA%\table-pager\config.toml (Windows)

[database]
# Only SQLite is supported
provider = "SQLite"

# DB_DIR=<directory>;DB_NAME=<name> opens <directory>/<name>.db
# A plain file path works too. Leave commented to use ./users.db
# connection_string = "DB_DIR=/path/to/dir;DB_NAME=users"

# Table to browse (must be a trusted, fixed name)
table = "data_types"

# Create the demo table and fill it with 1000 rows when it is empty
seed_on_start = true

[paging]
# Rows fetched each time the end of the list is reached
page_size = 50

# Ordering applied at start; leave empty for natural order
default_order_by = "ORDER BY id"

# Column list for the 'c' command
preset_selection = "id, name, amount"

# Ordering for the 'd' command
date_order_by = "ORDER BY creation_date DESC"

[formatting]
# Rendered with a fixed number of decimals
amount_column = "amount"
decimal_places = 2

# Surrounding double quotes are removed
name_column = "name"

# Timestamps cut to YYYY-MM-DD
date_column = "creation_date"
date_length = 10

# Times cut to HH:MM:SS
time_column = "creation_time"
time_length = 8

[logging]
# Used when RUST_LOG is not set
level = "info"
"#
        .to_string()
    }
}

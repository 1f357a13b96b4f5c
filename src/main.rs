use anyhow::{Context, Result};
use crossterm::style::Stylize;
use reedline::{
    Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline, Signal,
};
use std::borrow::Cow;
use std::path::Path;

use table_pager::config::Config;
use table_pager::display::TerminalTable;
use table_pager::logging::{self, LogRingBuffer};
use table_pager::provider::ConnectionProvider;
use table_pager::schema::SchemaReport;
use table_pager::seed::{ensure_seed_data, SeedOutcome};
use table_pager::sqlite::{open_provider, SqliteProvider, SQLITE_PROVIDER};
use table_pager::{LoadEvent, LoadPhase, PagedTableReader, ScrollController, ValueFormatter};

type Controller = ScrollController<Box<dyn ConnectionProvider>, TerminalTable>;

struct PagerPrompt {
    table: String,
    rows: usize,
}

impl Prompt for PagerPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} [{}]", self.table, self.rows))
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => "> ".into(),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                reedline::PromptViMode::Normal => "N> ".into(),
                reedline::PromptViMode::Insert => "I> ".into(),
            },
            PromptEditMode::Custom(str) => format!("{str}> ").into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

fn print_help() {
    println!("{}", "Table Pager - scroll through a database table".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  table-pager [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {} - Read configuration from PATH", "--config <PATH>".green());
    println!("  {}   - Connection string or database file", "--db <CONN>".green());
    println!("  {} - Table to browse", "--table <NAME>".green());
    println!("  {} - Rows per page", "--page-size <N>".green());
    println!("  {}       - Do not create demo data", "--no-seed".green());
    println!("  {}   - Write default configuration", "--init-config".green());
    println!(
        "  {} - Write commented configuration",
        "--generate-config".green()
    );
    println!();
    print_commands();
}

fn print_commands() {
    println!("{}", "Commands:".yellow());
    println!("  {}  - Load more rows (end of list reached)", "Enter, n".green());
    println!("  {}         - Show preset columns only", "c".green());
    println!("  {}         - All columns, ordered by date", "d".green());
    println!("  {}         - Reset and reload", "r".green());
    println!("  {}         - Show scroll state", "s".green());
    println!("  {}       - Show recent log lines", "log".green());
    println!("  {}         - Quit", "q".green());
    println!();
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|pos| args.get(pos + 1))
        .map(|s| s.as_str())
}

fn load_config(args: &[String]) -> Result<Config> {
    let mut config = match flag_value(args, "--config") {
        Some(path) => Config::load_from(Path::new(path))
            .with_context(|| format!("reading config {}", path))?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Could not load config ({}), using defaults", e);
            Config::default()
        }),
    };

    if let Some(db) = flag_value(args, "--db") {
        config.database.connection_string = Some(db.to_string());
    }
    if let Some(table) = flag_value(args, "--table") {
        config.database.table = table.to_string();
    }
    if let Some(size) = flag_value(args, "--page-size") {
        let size: usize = size
            .parse()
            .with_context(|| format!("invalid page size '{}'", size))?;
        if size == 0 {
            anyhow::bail!("page size must be positive");
        }
        config.paging.page_size = size;
    }
    if args.iter().any(|arg| arg == "--no-seed") {
        config.database.seed_on_start = false;
    }
    Ok(config)
}

fn seed(provider_name: &str, connection_string: &str) {
    if !provider_name.eq_ignore_ascii_case(SQLITE_PROVIDER) {
        return;
    }
    let result = SqliteProvider::from_connection_string(connection_string)
        .and_then(|provider| provider.open_raw())
        .and_then(|conn| ensure_seed_data(&conn));
    match result {
        Ok(SeedOutcome::AlreadyPresent(_)) => {
            println!("Data already exists. Skip inserting.")
        }
        Ok(SeedOutcome::Inserted(rows)) => println!("Inserted {} demo rows.", rows),
        Err(e) => eprintln!("{}", format!("Error creating demo data: {}", e).red()),
    }
}

fn report(event: &LoadEvent) {
    match event {
        LoadEvent::Exhausted => println!("{}", "No more data to load.".dark_grey()),
        LoadEvent::Skipped => println!("{}", "Nothing more to load.".dark_grey()),
        // Rows, no-data and failure notices are printed by the table itself
        LoadEvent::Appended { .. } | LoadEvent::NoData | LoadEvent::Failed(_) => {}
    }
}

fn print_state(controller: &Controller) {
    let state = controller.state();
    let query = controller.query();
    println!(
        "table={} phase={:?} offset={} end_of_data={} page_size={}",
        controller.table_name(),
        controller.phase(),
        state.offset,
        state.end_of_data,
        query.page_size
    );
    println!("selection={} order_by={:?}", query.selection, query.order_by);
}

fn print_log(buffer: &LogRingBuffer) {
    for entry in buffer.get_recent(20) {
        println!("{}", entry.format_for_display().dark_grey());
    }
}

fn run(config: Config, log_buffer: LogRingBuffer) -> Result<()> {
    let connection_string = config.database.resolved_connection_string()?;
    let table = config.database.table.clone();

    if config.database.seed_on_start {
        seed(&config.database.provider, &connection_string);
    }

    let provider = open_provider(&config.database.provider, &connection_string)?;
    let formatter = ValueFormatter::from_config(&config.formatting);
    let mut reader = PagedTableReader::with_formatter(provider, &table, formatter);
    reader.set_order_by(config.paging.default_order_by.clone());

    println!("----- Information about database scheme -----");
    let schema = SchemaReport::new(reader.cached_column_names(), reader.cached_column_types());
    if schema.is_consistent() {
        print!("{}", schema);
    } else {
        eprint!("{}", schema.to_string().red());
    }
    println!("--------------------------------");

    let mut controller: Controller = ScrollController::new(
        reader,
        TerminalTable::new(),
        table.clone(),
        config.paging.page_size,
    );
    print_commands();
    report(&controller.initial_load());

    let mut line_editor = Reedline::create();
    loop {
        let prompt = PagerPrompt {
            table: table.clone(),
            rows: controller.offset(),
        };
        let sig = line_editor.read_line(&prompt)?;
        match sig {
            Signal::Success(buffer) => match buffer.trim() {
                "" | "n" => {
                    if controller.phase() == LoadPhase::Loaded {
                        println!("Reached bottom edge, loading more data...");
                    }
                    report(&controller.incremental_load());
                }
                "c" => {
                    let order_by = controller.query().order_by.clone();
                    let event = controller
                        .reconfigure_and_reload(config.paging.preset_selection.clone(), order_by);
                    report(&event);
                }
                "d" => {
                    let event = controller
                        .reconfigure_and_reload("*", config.paging.date_order_by.clone());
                    report(&event);
                }
                "r" => report(&controller.reload()),
                "s" => print_state(&controller),
                "log" => print_log(&log_buffer),
                "h" | "help" | "?" => print_commands(),
                "q" | "quit" | "exit" => break,
                other => println!("{}", format!("Unknown command '{}'", other).yellow()),
            },
            Signal::CtrlC | Signal::CtrlD => break,
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.contains(&"--init-config".to_string()) {
        Config::default().save()?;
        println!(
            "Configuration initialized at: {:?}",
            Config::get_config_path()?
        );
        return Ok(());
    }

    if args.contains(&"--generate-config".to_string()) {
        let path = Config::get_config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Config::create_default_with_comments())?;
        println!("Configuration file created at: {:?}", path);
        println!("Edit this file to customize the pager.");
        return Ok(());
    }

    let config = load_config(&args)?;
    let log_buffer = logging::init_tracing(&config.logging.level);
    run(config, log_buffer)
}

use std::fs::File;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod columns;
mod controller;
mod date;
mod domain;
mod filter;
mod group_filter;
mod inputter;
mod model;
mod pagination;
mod popover;
mod record;
mod router;
mod row_actions;
mod store;
mod table_state;
mod ui;
mod users;

use controller::Controller;
use domain::{Message, UViewConfig, UViewError};
use model::{Model, Status};
use store::{JsonFileStore, MemoryStore, RecordStore};
use table_state::PageSize;
use ui::TableUI;
use users::{User, generate_users, load_users};

/// Users shown when neither a file nor `--generate` is given.
const DEFAULT_MOCK_USERS: usize = 500;

#[derive(Parser, Debug)]
#[command(version, about = "Review lending platform users in the terminal")]
struct Args {
    /// JSON document holding an array of users
    path: Option<String>,

    /// Show N generated mock users instead of reading a file
    #[arg(long, value_name = "N", conflicts_with = "path")]
    generate: Option<usize>,

    /// Keep viewed users in this JSON file
    #[arg(long, value_name = "PATH")]
    cache: Option<String>,

    #[arg(long, value_name = "PATH", default_value = "uview.log")]
    log_file: String,

    /// Rows per page: 10, 25, 50 or 100
    #[arg(long, default_value = "10", value_parser = parse_page_size)]
    page_size: PageSize,

    /// Milliseconds a new page slice shows the spinner
    #[arg(long, value_name = "MS", default_value_t = 200)]
    loading_delay: u64,
}

fn parse_page_size(s: &str) -> Result<PageSize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    PageSize::try_from(n).map_err(|n| format!("{n} is not one of 10, 25, 50, 100"))
}

fn expand(path: &str) -> Result<PathBuf, UViewError> {
    let expanded =
        shellexpand::full(path).map_err(|e| UViewError::LoadingFailed(e.to_string()))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

// The terminal belongs to the UI, so logs go to a file.
fn init_tracing(log_file: &Path) -> Result<(), UViewError> {
    let file = File::create(log_file)?;
    let filter = EnvFilter::try_from_env("UVIEW_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: Args) -> Result<(), UViewError> {
    init_tracing(&expand(&args.log_file)?)?;
    info!("Starting uview {}", env!("CARGO_PKG_VERSION"));

    let config = UViewConfig::default()
        .with_page_size(args.page_size)
        .with_loading_delay(Duration::from_millis(args.loading_delay));

    let users = match (&args.path, args.generate) {
        (Some(path), _) => load_users(&expand(path)?)?,
        (None, Some(count)) => generate_users(count),
        (None, None) => generate_users(DEFAULT_MOCK_USERS),
    };
    let store: Box<dyn RecordStore<User>> = match &args.cache {
        Some(path) => Box::new(JsonFileStore::open(expand(path)?)?),
        None => Box::new(MemoryStore::default()),
    };

    let mut model = Model::new(config.clone(), users, store);
    let ui = TableUI::default();
    let controller = Controller::new(&config);

    let mut terminal = ratatui::init();
    let result = execute!(stdout(), EnableMouseCapture)
        .map_err(UViewError::from)
        .and_then(|_| event_loop(&mut terminal, &mut model, &ui, &controller));
    let restored = execute!(stdout(), DisableMouseCapture);
    ratatui::restore();
    info!("Stopped uview");
    result?;
    restored?;
    Ok(())
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    model: &mut Model,
    ui: &TableUI,
    controller: &Controller,
) -> Result<(), UViewError> {
    let size = terminal.size()?;
    model.update(Some(Message::Resize(
        size.width as usize,
        size.height as usize,
    )));

    while model.status != Status::Quitting {
        // Render the current view
        terminal.draw(|f| ui.draw(model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(model)?;
        model.update(message);
    }
    Ok(())
}

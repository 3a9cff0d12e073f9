use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use crossterm::event::read as event_read;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use tern::services::terminal_modes::{self, TerminalModes};
use tern::services::tracing_setup;
use tern::{
    app::Editor, config::Config, model::filesystem::StdFileSystem,
    services::clipboard::SystemClipboard,
};

/// A small terminal text editor
#[derive(Parser, Debug)]
#[command(name = "tern")]
#[command(about = "A small terminal text editor with undo/redo", long_about = None)]
#[command(version)]
struct Args {
    /// File to open; created on first save if it does not exist
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to log file for editor diagnostics (default: system temp dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Stream every edit, undo and redo to the specified file as JSON lines
    #[arg(long, value_name = "LOG_FILE")]
    event_log: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn load_config(args: &Args) -> AnyhowResult<Config> {
    match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::load_or_default()),
    }
}

fn run_event_loop<B: Backend>(editor: &mut Editor, terminal: &mut Terminal<B>) -> AnyhowResult<()> {
    loop {
        terminal
            .draw(|frame| editor.render(frame))
            .context("Failed to draw frame")?;

        if editor.should_quit() {
            return Ok(());
        }

        let event = event_read().context("Failed to read terminal event")?;
        editor.handle_event(event)?;
    }
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(tracing_setup::default_log_path);
    tracing_setup::init_global(&log_file);
    tracing::info!("Editor starting");

    let config = load_config(&args)?;

    if args.dump_config {
        let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
        println!("{json}");
        return Ok(());
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        terminal_modes::emergency_cleanup();
        original_hook(panic);
    }));

    let (width, height) = crossterm::terminal::size().context("Failed to query terminal size")?;
    let mut editor = Editor::new(
        config,
        width,
        height,
        Box::new(SystemClipboard::new()),
        Arc::new(StdFileSystem),
    );

    if let Some(path) = &args.file {
        editor.open(path)?;
    }
    if let Some(path) = &args.event_log {
        editor.enable_event_log(path)?;
        tracing::info!("Event logging enabled: {}", path.display());
    }

    let mut terminal_modes = TerminalModes::enable().context("Failed to set up terminal")?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout())).context("Failed to create terminal")?;
    terminal.clear()?;

    let result = run_event_loop(&mut editor, &mut terminal);

    terminal_modes.undo();
    match &result {
        Ok(()) => tracing::info!("Editor exiting"),
        Err(e) => tracing::error!("Editor terminated: {:#}", e),
    }
    result
}

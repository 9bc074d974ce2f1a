// src/main.rs
mod app;
mod config;
mod error;
mod files;
mod input;
mod models;
mod network;
mod prompts;
mod render;
mod submission;
mod theme;
mod ui;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::Settings;
use crate::network::HttpComparisonClient;
use crate::prompts::{PromptStore, load_custom_prompt};
use crate::submission::SubmissionController;
use crate::theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "devis", version, about = "Compare two renovation quotes (PDF) with the analysis service")]
struct Cli {
    /// PDF quotes to preselect (at most two are kept)
    files: Vec<PathBuf>,

    /// Base URL of the comparison service, e.g. http://localhost:8000/api/v1
    #[arg(long)]
    api_base: Option<String>,

    /// Additional configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// File whose content replaces the default analysis prompt
    #[arg(long)]
    prompt_file: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("could not load configuration")?;
    if let Some(api_base) = cli.api_base.clone() {
        settings.api_base = api_base;
    }
    let _log_guard = init_logging(&settings, &cli.log_level)?;
    if let Some(path) = config::get_user_config_path() {
        match config::seed_user_config(&path) {
            Ok(true) => info!(path = %path.display(), "user config created"),
            Ok(false) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not create user config"),
        }
    }

    let client = HttpComparisonClient::new(&settings.api_base, settings.request_timeout())?;
    info!(endpoint = %client.endpoint(), "comparison service configured");

    let prompt = initial_prompt(&cli, &settings);
    let rt = Runtime::new()?;
    let controller = SubmissionController::new(Arc::new(client));
    let mut app = App::new(prompt, controller, rt.handle().clone());
    if !cli.files.is_empty() {
        app.add_paths(cli.files.clone());
    }

    terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("exiting");
    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> anyhow::Result<()> {
    let theme = Theme::default();
    loop {
        terminal.draw(|f| ui::draw(f, app, &theme))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if !input::handle_key(app, key)? {
                        return Ok(());
                    }
                }
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        } else {
            app.tick = app.tick.wrapping_add(1);
        }
    }
}

/// `--prompt-file`, then `custom_prompt_path`, then the built-in template.
fn initial_prompt(cli: &Cli, settings: &Settings) -> PromptStore {
    let custom = cli.prompt_file.as_deref().or(settings.custom_prompt_path.as_deref());
    match custom.map(load_custom_prompt) {
        Some(Ok(text)) => PromptStore::new(text),
        Some(Err(e)) => {
            warn!(error = %e, "falling back to the default prompt");
            PromptStore::default()
        }
        None => PromptStore::default(),
    }
}

/// The terminal belongs to the UI, so logs go to a daily file.
fn init_logging(settings: &Settings, level: &str) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = settings.log_dir();
    std::fs::create_dir_all(&log_dir).with_context(|| format!("cannot create log dir {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(&log_dir, "devis.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

mod app;
mod components;
mod config;
mod error;
mod event;
mod fs;
mod handler;
mod logging;
mod theme;
mod tui;
mod viewport;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use crate::app::{Action, App};
use crate::config::{AppConfig, GeneralConfig, LoggingConfig, ViewerConfig};
use crate::event::EventHandler;
use crate::fs::navigator::Navigator;
use crate::handler::KEY_HINTS;
use crate::tui::{install_panic_hook, Tui};
use crate::viewport::Viewport;

/// A split-pane terminal directory browser.
#[derive(Parser, Debug)]
#[command(name = "dirpeek", version, about)]
struct Cli {
    /// Directory to start in (defaults to the home directory)
    path: Option<String>,

    /// Read configuration from this file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Program used to open files
    #[arg(long)]
    viewer: Option<String>,

    /// List hidden entries from the start
    #[arg(short, long)]
    all: bool,

    /// Append log records to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// The CLI flags as the highest-priority config layer.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                start_path: self.path.clone(),
                show_hidden: self.all.then_some(true),
            },
            viewer: ViewerConfig {
                program: self.viewer.clone(),
            },
            logging: LoggingConfig {
                file: self.log_file.clone(),
                level: self.log_level.clone(),
            },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match try_main(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("{}", exit_message(&err));
            ExitCode::FAILURE
        }
    }
}

/// The line printed for a fatal error once the terminal is restored.
fn exit_message(err: &error::AppError) -> String {
    format!("dirpeek: {err}")
}

async fn try_main(cli: Cli) -> error::Result<()> {
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    logging::init(&config)?;

    let navigator = Navigator::open(config.start_path(), config.viewer_program())?;
    log::info!("starting in {}", navigator.current_path().display());

    install_panic_hook();

    let mut tui = Tui::new()?;
    let viewport = Viewport::new(
        tui.terminal()?,
        KEY_HINTS.iter().map(|s| s.to_string()).collect(),
    );
    let mut app = App::new(navigator, viewport, config.show_hidden());
    let mut events = EventHandler::new(Duration::from_millis(16));

    let outcome = run(&mut app, &mut tui, &mut events).await;
    tui.restore()?;
    outcome
}

/// Feed events to the app one at a time until it asks to quit.
async fn run<B: ratatui::backend::Backend>(
    app: &mut App<B>,
    tui: &mut Tui,
    events: &mut EventHandler,
) -> error::Result<()> {
    app.start()?;
    loop {
        match app.handle(events.next().await?)? {
            Action::Continue => {}
            Action::View(name) => {
                events.pause().await;
                tui.suspend()?;
                let outcome = app.view(&name);
                tui.resume()?;
                events.resume();
                app.finish_view(outcome)?;
            }
            Action::Quit => return Ok(()),
        }
    }
}

mod ai;
mod app;
mod bible;
mod config;
mod devotion;
mod handler;
mod language;
mod navigation;
mod tui;
mod ui;

use anyhow::Result;

use crate::app::App;
use crate::config::{Preferences, Settings};
use crate::tui::EventHandler;

/// Logs go to a file because the terminal is owned by the TUI. A missing
/// or unwritable log directory is not fatal.
fn init_logging() {
    let Some(dir) = dirs::data_local_dir().map(|d| d.join("bible-ai")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::File::create(dir.join("bible-ai.log")) else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let preferences = Preferences::load().unwrap_or_else(|error| {
        tracing::warn!(%error, "failed to load preferences, using defaults");
        Preferences::default()
    });
    let settings = Settings::resolve(&preferences);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let mut app = App::new(preferences, &settings, events.sender());
    app.start();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event)?;
        } else {
            break;
        }
    }

    tui::restore()?;
    Ok(())
}

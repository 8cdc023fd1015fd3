mod app;
mod client;
mod components;
mod config;
mod error;
mod event;
mod handler;
mod theme;
mod tree;
mod tui;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::app::App;
use crate::client::{spawn_listing, ArtifactLister, MlflowClient};
use crate::config::{AppConfig, GeneralConfig, ServerConfig, ThemeConfig, TreeConfig};
use crate::event::{Event, EventHandler};
use crate::tui::{install_panic_hook, Tui};

/// A terminal-based artifact tree browser for MLflow-compatible tracking servers.
#[derive(Parser, Debug)]
#[command(name = "artree", version, about)]
struct Cli {
    /// Run ids to browse (switch between them with '[' and ']')
    #[arg(required = true)]
    runs: Vec<String>,

    /// Tracking server base URL (e.g. http://127.0.0.1:5000)
    #[arg(long)]
    base_url: Option<String>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP timeout for listing requests, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Theme: "dark", "light" or "custom"
    #[arg(long)]
    theme: Option<String>,

    /// Disable nerd font icons
    #[arg(long)]
    no_icons: bool,

    /// Enable mouse capture
    #[arg(long)]
    mouse: bool,
}

impl Cli {
    /// Partial config carrying only the flags the user actually passed.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                base_url: self.base_url.clone(),
                timeout_ms: self.timeout_ms,
            },
            general: GeneralConfig {
                mouse: self.mouse.then_some(true),
            },
            tree: TreeConfig {
                use_icons: self.no_icons.then_some(false),
            },
            theme: ThemeConfig {
                scheme: self.theme.clone(),
                custom: None,
            },
        }
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    // Logging goes to stderr and is off unless RUST_LOG is set; initialize
    // before the terminal enters raw mode.
    env_logger::init();

    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    log::debug!(
        "base_url={} timeout_ms={} theme={}",
        cfg.base_url(),
        cfg.timeout_ms(),
        cfg.theme_scheme()
    );

    let client = MlflowClient::new(cfg.base_url(), Duration::from_millis(cfg.timeout_ms()))?;
    let base = client.base().clone();
    let lister: Arc<dyn ArtifactLister> = Arc::new(client);

    install_panic_hook();

    let mut tui = Tui::new(cfg.mouse_enabled())?;
    let colors = theme::resolve_theme(&cfg.theme);
    let use_icons = cfg.use_icons();

    let (mut app, initial_request) = App::new(cli.runs, base)?;
    let mut events = EventHandler::new(Duration::from_millis(16));
    let tx = events.sender();
    spawn_listing(lister.clone(), initial_request, tx.clone());

    loop {
        tui.draw(|frame| ui::render(&mut app, frame, &colors, use_icons))?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key, &lister, &tx),
            Event::ListingDone { request, result } => {
                let _ = app.on_listing_done(&request, result);
            }
            Event::Tick => app.clear_expired_status(),
            Event::Mouse(_) => {}
            Event::Resize(_, _) => {}
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    Ok(())
}

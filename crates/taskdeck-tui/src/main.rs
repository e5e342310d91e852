use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use taskdeck_core::organization::CreateOrganization;
use taskdeck_service::{DeckService, GraphqlService};
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskdeck_tui::app::App;
use taskdeck_tui::config::{Cli, Command};

/// How long the event loop waits for a key before checking for responses.
const TICK: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(command) => {
            init_logging_to_stderr();
            run_command(&cli.endpoint, command)
        }
        None => {
            if let Some(ref path) = cli.log_file {
                init_logging_to_file(path)?;
            }
            info!(endpoint = %cli.endpoint, "starting taskdeck");
            let service: Arc<dyn DeckService> = Arc::new(GraphqlService::new(&cli.endpoint));
            run_tui(service, cli.org)
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_logging_to_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

fn init_logging_to_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_command(endpoint: &str, command: Command) -> Result<()> {
    let service = GraphqlService::new(endpoint);
    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;

    match command {
        Command::Ping => {
            runtime
                .block_on(service.health_check())
                .with_context(|| format!("{endpoint} is not answering"))?;
            println!("{endpoint} is up");
        }
        Command::CreateOrg {
            name,
            slug,
            contact_email,
        } => {
            let input = CreateOrganization {
                name,
                slug,
                contact_email,
            }
            .normalized()?;
            let org = runtime
                .block_on(service.create_organization(&input))
                .context("failed to create organization")?;
            println!("Created organization {} ({})", org.name, org.slug);
            println!("  id:      {}", org.id);
            println!("  contact: {}", org.contact_email);
        }
    }
    Ok(())
}

fn run_tui(service: Arc<dyn DeckService>, org: Option<String>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, service, org);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    service: Arc<dyn DeckService>,
    org: Option<String>,
) -> Result<()> {
    let mut app = App::new(service, org)?;

    loop {
        app.pump();
        terminal.draw(|frame| app.render(frame))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            // q quits unless we're in an input mode
            if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}

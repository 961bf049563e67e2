mod api;
mod app;
mod config;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{ApiClient, SubmissionRecord};
use app::{App, Popup, Severity};
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "madoguchi")]
#[command(version = "0.1.0")]
#[command(about = "A terminal front-end for a demo JSON API backend")]
struct Args {
    /// Backend base URL (overrides the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Fetch /api/data, print the JSON to stdout, and exit
    #[arg(short, long)]
    fetch: bool,

    /// Send the test record to /api/submit, print the response, and exit
    #[arg(short, long)]
    submit: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = AppConfig::load().unwrap_or_default();
    let base_url = args.url.unwrap_or_else(|| config.backend_url.clone());
    let client = ApiClient::new(base_url);

    // Handle CLI-only commands
    if args.fetch {
        return print_data(&client).await;
    }

    if args.submit {
        return submit_test(&client).await;
    }

    // Run TUI
    run_tui(config, client).await
}

async fn print_data(client: &ApiClient) -> Result<()> {
    let payload = client.fetch_data().await?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

async fn submit_test(client: &ApiClient) -> Result<()> {
    let record = SubmissionRecord::test();
    let response = client.submit(&record).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn run_tui(config: AppConfig, client: ApiClient) -> Result<()> {
    ui::init_theme(theme::Theme::load(config.theme.as_ref()));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let fetch_on_start = config.fetch_on_start;
    let mut app = App::new(config, client);
    if fetch_on_start {
        app.load_data();
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c')
                            if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                        {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key).await {
                                app.notify(format!("Error: {}", e), Severity::Danger);
                            }
                        }
                    }
                }
            }
        }

        // Apply completed requests and run timed housekeeping
        app.tick();
    }
}

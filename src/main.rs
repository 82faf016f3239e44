mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use anyhow::{Context, bail};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::error;
use playoff_api::client::PoolApi;
use playoff_api::records::{validate_games_started, validate_partial_picks, validate_team};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Settings log their own problems.
    tui_logger::init_logger(log::LevelFilter::Info)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let settings = AppSettings::load();
    if handle_cli_args(&settings).await? {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    let client = PoolApi::new(settings.api_url.clone()).with_season_file(settings.season_file.clone());
    let year = settings.year;
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, year, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic pool refresh thread
    let periodic_updater = PeriodicRefresher::new(network_req_tx.clone());
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Trigger pool load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();

    Ok(())
}

/// Handles flags that print and exit, including the admin commands that
/// update the season. Returns true when the TUI should not start.
async fn handle_cli_args(settings: &AppSettings) -> anyhow::Result<bool> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(arg) = args.first() else {
        return Ok(false);
    };
    let value = |i: usize| arg_value(&args, i);

    match arg.as_str() {
        "-h" | "--help" => println!("{}", usage_text()),
        "-V" | "--version" => println!("playoff-pool {}", env!("CARGO_PKG_VERSION")),
        "--set-results" => {
            let input = value(1)?;
            let results = validate_partial_picks(input)?;
            admin_client(settings)?.set_results(settings.year, &results).await?;
            println!("{} results set to {results}", settings.year);
        }
        "--games-started" => {
            let started = validate_games_started(value(1)?)?;
            admin_client(settings)?.set_games_started(settings.year, started).await?;
            println!("{} games started: {started}", settings.year);
        }
        "--set-team" => {
            let (index, name) = (value(1)?, value(2)?);
            let seed = validate_team(index, name)?;
            admin_client(settings)?.set_team(settings.year, seed, name).await?;
            println!("{} {seed} is now the {name}", settings.year);
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
    Ok(true)
}

fn arg_value(args: &[String], i: usize) -> anyhow::Result<&str> {
    args.get(i)
        .map(String::as_str)
        .with_context(|| format!("{} needs a value\n\n{}", args[0], usage_text()))
}

fn admin_client(settings: &AppSettings) -> anyhow::Result<PoolApi> {
    if settings.api_url.is_none() {
        bail!("PLAYOFF_POOL_API must point at the bracket store to update a season");
    }
    Ok(PoolApi::new(settings.api_url.clone()))
}

fn usage_text() -> &'static str {
    "playoff-pool - NFL playoff bracket pool terminal UI

Usage:
  playoff-pool
  playoff-pool --help
  playoff-pool --version

Admin (updates the season of PLAYOFF_POOL_YEAR):
  playoff-pool --set-results <13 digits of 0/1/2>
  playoff-pool --games-started <0|1>
  playoff-pool --set-team <seed, e.g. A1> <team name, e.g. Chiefs>

Environment:
  PLAYOFF_POOL_API          Base URL of the bracket store (offline when unset)
  PLAYOFF_POOL_YEAR         Season year (default: the season being played)
  PLAYOFF_POOL_GROUP        Group to show and submit to (default All)
  PLAYOFF_POOL_NAME         Display name for new brackets (default $USER)
  PLAYOFF_POOL_DEVICE_ID    Override the device id kept in the config dir
  PLAYOFF_POOL_SEASON_JSON  Path to a local season snapshot
  PLAYOFF_POOL_LOG          Log level: error, warn, info, debug, trace"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let year = app.lock().await.settings.year;
            let _ = network_requests.send(NetworkRequest::LoadPool { year }).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::PoolLoaded { season, records } => {
            let mut guard = app.lock().await;
            guard.on_pool_loaded(season, records);
        }
        NetworkResponse::Submitted { player, edit } => {
            let mut guard = app.lock().await;
            guard.on_submitted(player, edit);
            drop(guard);
            let _ = network_requests.send(NetworkRequest::RefreshPool).await;
        }
        NetworkResponse::SubmitRejected { reason } => {
            let mut guard = app.lock().await;
            guard.on_submit_rejected(reason);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

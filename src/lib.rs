pub mod alarm;
#[cfg(feature = "audio")]
pub mod audio;
pub mod bell;
pub mod chess_rules;
pub mod commands;
pub mod error;
pub mod events;
pub mod models;
pub mod puzzles;
pub mod session;
pub mod settings;
mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use alarm::{AlarmRing, AlarmScheduler};
use bell::{AlarmBell, SilentBell};
use commands::ConsoleCommand;
use events::{AlarmEvent, EventBroadcaster};
use puzzles::{builtin_puzzles, load_with_fallback, PuzzleRepository, PuzzleSource};
use session::PuzzleController;
use settings::SettingsStore;

pub use error::{AlarmError, Result as AlarmResult};

/// Everything a front end needs, wired together.
pub struct AppState {
    pub scheduler: AlarmScheduler,
    pub puzzles: PuzzleController,
    pub events: EventBroadcaster,
    pub settings: SettingsStore,
    pub bell: Arc<dyn AlarmBell>,
}

impl AppState {
    pub fn new(repo: PuzzleRepository, settings: SettingsStore, bell: Arc<dyn AlarmBell>) -> Self {
        let ring = AlarmRing::new();
        let events = EventBroadcaster::new();
        let puzzles = PuzzleController::new(Arc::new(repo), ring.clone(), events.clone());
        let scheduler = AlarmScheduler::new(
            ring,
            puzzles.clone(),
            bell.clone(),
            events.clone(),
            settings.ring_interval(),
        );

        Self {
            scheduler,
            puzzles,
            events,
            settings,
            bell,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "chess-alarm", about = "Alarm clock you silence by solving a chess puzzle")]
struct Cli {
    /// Settings file (default: <config dir>/chess-alarm/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Extra puzzles as a JSON array (overrides the settings file)
    #[arg(long)]
    puzzles: Option<PathBuf>,

    /// Seconds between alarm checks (overrides the settings file)
    #[arg(long)]
    tick_secs: Option<u64>,

    /// Count alarm signals without making any sound
    #[arg(long)]
    silent: bool,
}

fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chess-alarm")
        .join("settings.json")
}

fn make_bell(silent: bool, volume: u8) -> Arc<dyn AlarmBell> {
    if silent {
        return Arc::new(SilentBell::new());
    }

    #[cfg(feature = "audio")]
    {
        Arc::new(bell::AudioBell::new(volume))
    }

    #[cfg(not(feature = "audio"))]
    {
        let _ = volume;
        Arc::new(bell::ConsoleBell)
    }
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    info!("Chess alarm starting up...");

    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
    let settings = SettingsStore::new(settings_path)?;
    let current = settings.get();

    let mut repo = PuzzleRepository::load(builtin_puzzles())
        .context("Builtin puzzles failed validation")?;
    let puzzle_file = cli.puzzles.clone().unwrap_or(current.puzzle_file.clone());
    match load_with_fallback(&mut repo, &puzzle_file) {
        PuzzleSource::BuiltinOnly { reason } => {
            info!("Using {} builtin puzzles ({reason})", repo.len())
        }
        PuzzleSource::Extended { added, skipped } => {
            info!("Puzzle file added {added} puzzles, skipped {skipped}")
        }
    }

    let tick_interval = match cli.tick_secs {
        Some(secs) => std::time::Duration::from_secs(secs.max(1)),
        None => settings.tick_interval(),
    };
    let bell = make_bell(cli.silent, current.volume);
    let state = Arc::new(AppState::new(repo, settings, bell));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = runtime.block_on(async move {
        let shutdown = CancellationToken::new();
        let scheduler_task = state.scheduler.spawn(tick_interval, shutdown.clone());
        let printer_task = tokio::spawn(print_events(state.events.clone(), shutdown.clone()));

        println!("{}", commands::HELP);
        console_loop(&state, shutdown.clone()).await;

        shutdown.cancel();
        if let Err(err) = scheduler_task.await {
            warn!("Scheduler task ended abnormally: {err}");
        }
        let _ = printer_task.await;
        Ok(())
    });

    // A pending stdin read would otherwise hold the runtime open.
    runtime.shutdown_timeout(std::time::Duration::from_millis(200));
    result
}

async fn console_loop(state: &AppState, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            _ = shutdown.cancelled() => break,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!("Failed to read console input: {err}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<ConsoleCommand>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        let quit = command == ConsoleCommand::Quit;

        match commands::execute(state, command).await {
            Ok(reply) => println!("{reply}"),
            Err(err) => println!("{err}"),
        }
        if quit {
            break;
        }
    }
}

async fn print_events(events: EventBroadcaster, shutdown: CancellationToken) {
    let mut rx = events.subscribe();
    loop {
        let event = tokio::select! {
            event = rx.recv() => event,
            _ = shutdown.cancelled() => break,
        };

        match event {
            Ok(AlarmEvent::AlarmFired {
                alarm,
                description,
                message,
            }) => {
                println!("\n*** {} ***\n{message}\n{description}", alarm.label());
            }
            Ok(AlarmEvent::AlarmFireFailed { alarm_id, error }) => {
                println!("Alarm {alarm_id} could not start: {error}");
            }
            Ok(AlarmEvent::AlarmDismissed) => println!("Alarm stopped."),
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Event printer skipped {skipped} events");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}

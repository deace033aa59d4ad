use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use boardwatch::board::Color;
use boardwatch::core::config::{default_settings_path, load_settings, save_settings};
use boardwatch::core::{AnalyzerSettings, ConfigChannel, SettingsRecord, SettingsWatcher};
use boardwatch::io::{ConsolePresenter, JsonFileSource};
use boardwatch::pipeline::{
    command_channel, AnalyzerLauncher, Command, CommandSender, EngineLauncher, FaultRecoveryLoop, LoopOptions,
};
use boardwatch::selection::RngDraws;

#[derive(Parser, Debug)]
#[command(
    name = "boardwatch",
    about = "Follow a game from board snapshots and suggest moves with a UCI engine"
)]
struct Args {
    /// JSON board document kept up to date by the board reader
    #[arg(long, default_value = "board.json")]
    snapshot_file: PathBuf,

    /// Settings file to load and watch (defaults to the user config directory)
    #[arg(long)]
    settings_file: Option<PathBuf>,

    /// Engine executable; searched for when absent or missing
    #[arg(long)]
    engine_path: Option<PathBuf>,

    /// Engine think time per analysis, e.g. `100ms`
    #[arg(long, value_parser = humantime::parse_duration, default_value = "100ms")]
    think_time: Duration,

    /// Engine lines requested per analysis
    #[arg(long, default_value_t = 5)]
    candidates: usize,

    /// Pause between monitoring cycles
    #[arg(long, value_parser = humantime::parse_duration, default_value = "200ms")]
    poll_interval: Duration,

    /// Override: analysis on/off
    #[arg(long)]
    enabled: Option<bool>,

    /// Override: side to analyse for (`white` or `black`)
    #[arg(long, value_parser = parse_side)]
    side: Option<Color>,

    /// Override: engine strength
    #[arg(long)]
    elo: Option<i32>,

    /// Override: arrow colour as `#RRGGBB`
    #[arg(long)]
    arrow_color: Option<String>,

    /// Override: legit mode on/off
    #[arg(long)]
    legit_mode: Option<bool>,

    /// Seed for move selection
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn overrides(&self) -> SettingsRecord {
        SettingsRecord {
            enabled: self.enabled,
            side: self.side,
            elo: self.elo,
            arrow_color: self.arrow_color.clone(),
            legit_mode: self.legit_mode,
            ..SettingsRecord::default()
        }
    }
}

fn parse_side(value: &str) -> Result<Color, String> {
    match value.to_ascii_lowercase().as_str() {
        "white" | "w" => Ok(Color::White),
        "black" | "b" => Ok(Color::Black),
        other => Err(format!("expected `white` or `black`, got {other:?}")),
    }
}

/// Settings file contents over defaults; a missing file is created
fn initial_settings(path: &Path) -> AnalyzerSettings {
    let defaults = AnalyzerSettings::default();
    if !path.exists() {
        tracing::info!("[SETTINGS] No settings file found at {:?}. Using defaults.", path);
        if let Err(e) = save_settings(path, &defaults) {
            tracing::warn!("[SETTINGS] Could not create settings file: {e}");
        }
        return defaults;
    }
    match load_settings(path, &defaults) {
        Ok(settings) => {
            tracing::info!("[SETTINGS] Loaded settings from {:?}", path);
            settings
        }
        Err(e) => {
            tracing::warn!("[SETTINGS] Failed to load settings file at {:?}: {e}. Using defaults.", path);
            defaults
        }
    }
}

/// Forward `v`/`b`/`c` key presses on stdin to the loop
fn spawn_key_reader(commands: CommandSender) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            for command in line.chars().filter_map(Command::from_key) {
                if commands.send(command).is_err() {
                    return;
                }
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let settings_path = args.settings_file.clone().unwrap_or_else(default_settings_path);
    let settings = initial_settings(&settings_path)
        .merged(&args.overrides())
        .context("invalid command-line settings")?;
    tracing::info!(
        "[SETTINGS] Playing side: {}, engine ELO: {}, arrow colour: {}, legit mode: {}",
        settings.side,
        settings.elo,
        settings.arrow_color.rgba(),
        settings.legit.enabled
    );
    let elo = settings.elo;
    let config = ConfigChannel::new(settings);

    let (stop_tx, stop_rx) = watch::channel(false);
    let watcher = SettingsWatcher::new(&settings_path, config.clone()).spawn(stop_rx.clone());

    let launcher = Arc::new(EngineLauncher {
        path_hint: args.engine_path.clone(),
        ..EngineLauncher::default()
    });
    let engine = match launcher.launch(elo).await {
        Ok(engine) => Some(engine),
        Err(e) => {
            tracing::warn!("[ENGINE] {e}. Continuing without analysis.");
            None
        }
    };

    let (command_tx, command_rx) = command_channel();
    spawn_key_reader(command_tx);
    tracing::info!("Ready! Type v (switch side), b (toggle legit mode) or c (clear) and press Enter.");

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cleaning up...");
            let _ = stop_tx.send(true);
        }
    });

    let draws = RngDraws::new(match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    });
    let source = JsonFileSource::new(&args.snapshot_file);
    let options = LoopOptions {
        poll_interval: args.poll_interval,
        think_time: args.think_time,
        candidates: args.candidates,
        ..LoopOptions::default()
    };

    FaultRecoveryLoop::new(
        config,
        Box::new(source.clone()),
        Box::new(source),
        Box::new(ConsolePresenter::new()),
        draws,
    )
    .with_options(options)
    .with_engine(engine, elo)
    .with_launcher(launcher)
    .with_commands(command_rx)
    .with_status(Box::new(std::io::stdout()))
    .with_settings_file(settings_path)
    .run(stop_rx)
    .await;

    watcher.await.context("settings watcher panicked")?;
    Ok(())
}

//! `depistage`: terminal UI for the screening record store.
//!
//! # Usage
//!
//! ```
//! depistage --url http://localhost:3000
//! depistage --config ~/.config/depistage/config.toml
//! depistage export --output campagne.csv
//! depistage stats
//! ```

mod app;
mod client;
mod ui;

use std::{
  fs::File,
  io,
  path::PathBuf,
  sync::Mutex,
  time::{Duration, Instant},
};

use anyhow::{Context, Result};
use app::{App, Message};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use depistage_core::{export, stats::Statistics};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tokio::sync::mpsc;

const DEFAULT_URL: &str = "http://localhost:3000";
const DEFAULT_REFRESH_SECS: u64 = 5;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "depistage", about = "Terminal UI for breast-cancer screening records")]
struct Args {
  /// Path to a TOML config file (url, refresh_secs).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the depistage server (default: http://localhost:3000).
  #[arg(long, env = "DEPISTAGE_URL")]
  url: Option<String>,

  /// Seconds between background refreshes of the record list.
  #[arg(long, value_name = "SECS")]
  refresh_secs: Option<u64>,

  /// Write logs to this file. The terminal is owned by the UI, so nothing is
  /// logged without it.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Download every record as a CSV spreadsheet.
  Export {
    /// Destination file (default: depistages-<today>.csv).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
  },
  /// Print the dashboard figures.
  Stats,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:          String,
  #[serde(default)]
  refresh_secs: Option<u64>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    let file = File::create(path)
      .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
      .with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
          .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
      )
      .with_writer(Mutex::new(file))
      .with_ansi(false)
      .init();
  }

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
  };
  let refresh = Duration::from_secs(
    args
      .refresh_secs
      .or(file_cfg.refresh_secs)
      .unwrap_or(DEFAULT_REFRESH_SECS)
      .max(1),
  );

  let client = ApiClient::new(api_config)?;

  match args.command {
    Some(Command::Export { output }) => export_to_file(&client, output).await,
    Some(Command::Stats) => print_stats(&client).await,
    None => run_tui(client, refresh).await,
  }
}

// ─── One-shot commands ────────────────────────────────────────────────────────

async fn export_to_file(client: &ApiClient, output: Option<PathBuf>) -> Result<()> {
  let path = output.unwrap_or_else(|| {
    PathBuf::from(export::file_name(chrono::Local::now().date_naive()))
  });
  let csv = client
    .export_csv()
    .await
    .with_context(|| format!("exporting from {}", client.base_url()))?;
  tokio::fs::write(&path, csv)
    .await
    .with_context(|| format!("writing {}", path.display()))?;
  println!("{}", path.display());
  Ok(())
}

async fn print_stats(client: &ApiClient) -> Result<()> {
  let s: Statistics = client
    .stats()
    .await
    .with_context(|| format!("fetching statistics from {}", client.base_url()))?;

  println!("Dépistages             {}", s.total);
  println!("Âge moyen              {:.1}", s.average_age);
  println!("Vaccinées              {} ({}%)", s.vaccinated, s.vaccination_rate());
  println!("Mammographies          {} ({}%)", s.mammography_done, s.mammography_rate());
  println!(
    "Consultations gynéco   {} ({}%)",
    s.gyneco_consultation_count,
    s.gyneco_rate()
  );
  let e = s.exams_breakdown;
  println!(
    "Examens                FCU {} · HPV {} · Écho {} · Thermo {} · Anapath {}",
    e.fcu, e.hpv, e.mammary_ultrasound, e.thermo_ablation, e.anapath
  );
  Ok(())
}

// ─── Terminal UI ──────────────────────────────────────────────────────────────

async fn run_tui(client: ApiClient, refresh: Duration) -> Result<()> {
  let (tx, rx) = mpsc::unbounded_channel();
  let mut app = App::new(client, tx);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app, rx, refresh).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  mut rx: mpsc::UnboundedReceiver<Message>,
  refresh: Duration,
) -> Result<()> {
  app.refresh();
  let mut last_refresh = Instant::now();

  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if key.kind == KeyEventKind::Press && !app.handle_key(key) {
        break;
      }
    }

    // Results of background requests.
    while let Ok(msg) = rx.try_recv() {
      app.handle_message(msg);
    }

    if last_refresh.elapsed() >= refresh {
      app.refresh();
      last_refresh = Instant::now();
    }
  }

  Ok(())
}

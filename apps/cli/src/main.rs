mod driver;
mod replay;
mod trace;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use fingerspell_application::{open_speller, Settings};
use fingerspell_events::{event_names, EventBus, EventBusRef, NullEventBus, StatusEvent};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::driver::Driver;
use crate::trace::{read_trace, TraceLine};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Parser, Debug)]
#[command(name = "fingerspell")]
#[command(about = "Turn recorded fingerspelling detections into words", long_about = None)]
struct Cli {
    /// Settings file (JSON). Defaults to the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Minimum detector confidence, 0.0 to 1.0.
    #[arg(long)]
    confidence: Option<f32>,
    /// How long a sign must be held before it is added, in milliseconds.
    #[arg(long)]
    hold_ms: Option<u64>,
    /// History log file.
    #[arg(long)]
    log: Option<PathBuf>,
    /// Replay at the recorded pace instead of as fast as possible.
    #[arg(long)]
    realtime: bool,
    /// Camera index to start detection on.
    #[arg(long, default_value_t = 0)]
    device: u32,
    /// Do not print status messages.
    #[arg(long, short)]
    quiet: bool,
    /// JSON-lines trace of detections and commands, or `-` for stdin.
    trace: PathBuf,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        let path = self
            .config
            .clone()
            .or_else(|| dirs::config_dir().map(|d| d.join("fingerspell").join(SETTINGS_FILE)));
        let mut settings = match path {
            Some(path) => Settings::load(&path)?,
            None => Settings::default(),
        };

        if let Some(confidence) = self.confidence {
            settings.confidence_min = confidence;
        }
        if let Some(hold_ms) = self.hold_ms {
            settings.hold_ms = hold_ms;
        }
        if let Some(log) = &self.log {
            settings.log_path = log.clone();
        }
        Ok(settings.normalized())
    }

    fn read_trace(&self) -> anyhow::Result<Vec<TraceLine>> {
        if self.trace.as_os_str() == "-" {
            return read_trace(io::stdin().lock());
        }
        let file = File::open(&self.trace)
            .with_context(|| format!("failed to open trace {}", self.trace.display()))?;
        read_trace(BufReader::new(file))
    }
}

/// Prints every status message on its own line. Errors go to stderr.
struct StatusPrinter;

impl EventBus for StatusPrinter {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        if topic != event_names::STATUS {
            return;
        }
        match serde_json::from_value::<StatusEvent>(payload) {
            Ok(event) if event.status.is_error() => eprintln!("{}", event.message),
            Ok(event) => println!("{}", event.message),
            Err(e) => tracing::warn!(error = %e, "unreadable status event"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fingerspell=debug")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let trace = cli.read_trace()?;
    tracing::info!(lines = trace.len(), realtime = cli.realtime, "trace loaded");

    let bus: EventBusRef = if cli.quiet {
        Arc::new(NullEventBus)
    } else {
        Arc::new(StatusPrinter)
    };
    let speller = open_speller(&settings, bus)?;
    let mut driver = Driver::new(speller, cli.device.saturating_add(1));
    driver.begin(cli.device)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let cancel = CancellationToken::new();
    runtime.block_on(replay(&mut driver, trace, cli.realtime, cancel));

    let speller = driver.session().speller();
    println!("Current word: {}", speller.current_word());
    println!("History:");
    for entry in speller.history() {
        println!("  {entry}");
    }
    Ok(())
}

async fn replay(
    driver: &mut Driver,
    trace: Vec<TraceLine>,
    realtime: bool,
    cancel: CancellationToken,
) {
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            interrupt.cancel();
        }
    });

    let started = tokio::time::Instant::now();
    for line in &trace {
        if realtime {
            let due = started + Duration::from_millis(line.t_ms);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep_until(due) => {}
            }
        } else {
            // Let the interrupt task run between lines.
            tokio::task::yield_now().await;
            if cancel.is_cancelled() {
                break;
            }
        }
        driver.apply(line);
    }

    if cancel.is_cancelled() {
        driver.cancel();
    } else {
        driver.finish();
    }
}

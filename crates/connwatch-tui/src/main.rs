//! `connwatch-tui` — terminal viewer for firewall connection logs.
//!
//! Replays a captured connection log (JSON lines) into the bundled
//! in-memory store and renders it live through the
//! [`ConnView`](connwatch_core::ConnView) synchronization engine:
//! appends, retention trims, and log clears arrive as incremental
//! patches or resets, never as full re-reads.
//!
//! Logs are written to a file (default `/tmp/connwatch-tui.log`) to
//! avoid corrupting the terminal UI.

mod action;
mod app;
mod bridge;
mod event;
mod replay;
mod theme;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use connwatch_core::{AppInfoCache, ConnView, HostInfoCache, MemoryConnLog};

use crate::app::App;

/// Terminal viewer for captured firewall connection logs.
#[derive(Parser, Debug)]
#[command(name = "connwatch-tui", version, about)]
struct Cli {
    /// Capture file to replay (JSON lines)
    capture: PathBuf,

    /// Delay between replayed capture lines
    #[arg(short = 'i', long, default_value = "100ms", value_parser = humantime::parse_duration)]
    interval: std::time::Duration,

    /// Retention bound of the in-memory log
    #[arg(short = 'c', long, default_value_t = 10_000)]
    capacity: usize,

    /// Start with endpoint addresses resolved to host names
    #[arg(short = 'r', long)]
    resolve: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/connwatch-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that
/// would corrupt the TUI output. Returns a guard that must be held for
/// the lifetime of the application so logs flush on exit.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("connwatch_tui={log_level},connwatch_core={log_level}"))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("connwatch-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    info!(capture = %cli.capture.display(), capacity = cli.capacity, "starting connwatch-tui");

    // Load the capture up front so a bad path fails before the
    // alternate screen swallows the error output.
    let lines = replay::load(&cli.capture)?;

    let log = Arc::new(MemoryConnLog::with_capacity(cli.capacity));
    let apps = Arc::new(AppInfoCache::new());
    let hosts = Arc::new(HostInfoCache::new());

    let (mut view, view_events) =
        ConnView::new(Arc::clone(&log), Arc::clone(&apps), Arc::clone(&hosts));
    view.set_resolve_address(cli.resolve);

    let mut app = App::new(view, view_events);

    let cancel = CancellationToken::new();
    bridge::spawn_change_forwarder(
        Arc::clone(&log),
        Arc::clone(&apps),
        Arc::clone(&hosts),
        app.action_sender(),
        cancel.clone(),
    );
    replay::spawn_feeder(
        lines,
        cli.interval,
        log,
        apps,
        hosts,
        app.action_sender(),
        cancel.clone(),
    );

    let result = app.run().await;
    cancel.cancel();
    result
}

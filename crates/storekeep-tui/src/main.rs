//! storekeep — terminal admin panel for a storekeep inventory server.

mod action;
mod app;
mod component;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::Result;
use storekeep_core::Backend;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::tui::Tui;

#[derive(Parser)]
#[command(
    name = "storekeep",
    version,
    about = "Terminal admin panel for a storekeep inventory server"
)]
struct Cli {
    /// Base URL of the REST API
    #[arg(
        long,
        env = "STOREKEEP_URL",
        default_value = "http://localhost:8082/api"
    )]
    url: String,

    /// Log file path (stdout is owned by the TUI)
    #[arg(long, env = "STOREKEEP_LOG", default_value = "/tmp/storekeep.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. The returned guard must stay alive for the whole
/// run or buffered log lines are lost.
fn setup_tracing(cli: &Cli) -> tracing_appender::non_blocking::WorkerGuard {
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "storekeep={level},storekeep_core={level},storekeep_api={level}"
        ))
    });

    let dir = cli.log_file.parent().unwrap_or_else(|| Path::new("."));
    let file = cli
        .log_file
        .file_name()
        .unwrap_or_else(|| OsStr::new("storekeep.log"));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_tracing(&cli);
    tui::install_hooks()?;

    let backend = Backend::new(&cli.url)?;
    info!(url = %cli.url, "starting storekeep");

    let mut tui = Tui::new()?;
    tui.enter()?;

    let mut app = App::new(backend, cli.url.clone());
    let result = app.run(&mut tui).await;

    tui.exit();
    info!("shut down cleanly");
    result
}

mod app;
mod config;
mod gui;
mod simulator;
mod stats;
mod tui;
mod ui;
mod views;

use anyhow::Context;
use app::App;
use clap::Parser;
use config::DashboardConfig;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "mldash-tui: live dashboard for an ML trading model (simulated metrics)",
    after_help = "EXAMPLES:
    # Terminal dashboard
    cargo run --release

    # Desktop dashboard, faster simulation
    cargo run --release -- --gui --tick-ms 1000

    # Print the dashboard state after 10 simulated ticks
    cargo run --release -- --snapshot --ticks 10 --seed 42"
)]
struct Args {
    /// Launch in GUI mode
    #[arg(long)]
    gui: bool,

    /// Print the dashboard view as JSON and exit
    #[arg(long, conflicts_with = "gui")]
    snapshot: bool,

    /// Simulated ticks to apply before printing the snapshot
    #[arg(long, default_value_t = 0, requires = "snapshot")]
    ticks: u64,

    /// Simulator period in milliseconds (default: 3000, env: MLDASH_TICK_MS)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Seed for the metric simulator (env: MLDASH_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Log file used in terminal mode (default: mldash.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("mldash_tui=info,wgpu_core=error,wgpu_hal=error")
    })
}

/// The terminal owns stdout, so TUI mode logs to a file.
fn init_file_logging(path: &std::path::Path) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(guard)
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

fn invalid_config(e: anyhow::Error) -> io::Error {
    error!("Invalid configuration: {:#}", e);
    io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid configuration: {:#}", e))
}

/// Applies `ticks` seeded perturbations to a fresh app and renders its view as JSON.
fn render_snapshot(cfg: &DashboardConfig, ticks: u64) -> anyhow::Result<String> {
    let mut app = App::new();
    let mut rng = simulator::make_rng(cfg.seed);
    for _ in 0..ticks {
        app.apply(&simulator::Perturbation::sample(&mut rng));
    }
    serde_json::to_string_pretty(&app.snapshot()).context("Failed to serialize snapshot")
}

#[tokio::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let terminal_mode = !args.gui && !args.snapshot;
    let _log_guard = if terminal_mode {
        let path = args
            .log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(config::DEFAULT_LOG_FILE));
        match init_file_logging(&path) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Failed to initialize file logging: {:#}", e);
                None
            }
        }
    } else {
        init_stderr_logging();
        None
    };

    let cfg = DashboardConfig::from_env_and_args(args.tick_ms, args.seed).map_err(invalid_config)?;

    if args.snapshot {
        let json = render_snapshot(&cfg, args.ticks).map_err(|e| {
            error!("Snapshot failed: {:#}", e);
            io::Error::other(format!("{:#}", e))
        })?;
        println!("{}", json);
        return Ok(());
    }

    if args.gui {
        let options = eframe::NativeOptions::default();
        let runtime = tokio::runtime::Handle::current();
        info!("Launching GUI (tick={:?})", cfg.tick_interval);
        eframe::run_native(
            "ML Trading Dashboard",
            options,
            Box::new(move |cc| {
                let _rt = runtime.enter();
                let ctx = cc.egui_ctx.clone();
                let app = App::with_simulator_notify(&cfg, Some(Box::new(move || ctx.request_repaint())));
                Ok(Box::new(gui::GuiApp::new(app)))
            }),
        )
        .map_err(|e| io::Error::other(e.to_string()))?;
        return Ok(());
    }

    let mut terminal = tui::init()?;
    let mut app = App::with_simulator(&cfg);
    let res = app.run(&mut terminal).await;

    tui::restore()?;

    if let Err(e) = res {
        error!("Error: {:?}", e);
        eprintln!("Error: {:?}", e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_an_error() {
        let err = DashboardConfig::resolve(None, None, Some("fast".to_string()), None).unwrap_err();
        let io_err = invalid_config(err);
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);
        assert!(io_err.to_string().contains(config::ENV_TICK_MS));
    }

    #[test]
    fn test_render_snapshot_counts_ticks() {
        let cfg = DashboardConfig {
            seed: Some(42),
            ..DashboardConfig::default()
        };
        let value: serde_json::Value = serde_json::from_str(&render_snapshot(&cfg, 7).unwrap()).unwrap();
        assert_eq!(value["ticks"], 7);
        assert!(value["model"]["samples_processed"].as_u64().unwrap() >= 1250);

        let again: serde_json::Value = serde_json::from_str(&render_snapshot(&cfg, 7).unwrap()).unwrap();
        assert_eq!(value, again);
    }

    #[test]
    fn test_snapshot_flags() {
        assert!(Args::try_parse_from(["mldash-tui", "--ticks", "3"]).is_err());
        assert!(Args::try_parse_from(["mldash-tui", "--snapshot", "--gui"]).is_err());
        let args = Args::try_parse_from(["mldash-tui", "--snapshot", "--ticks", "3"]).unwrap();
        assert_eq!(args.ticks, 3);
    }
}

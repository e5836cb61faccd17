//! landmark-cursor - hand-landmark pointer control
//!
//! Entry point for the binary.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

use landmark_cursor::config::{Config, SinkBackend};
use landmark_cursor::control::{ControlLoop, DetectionHandler};
use landmark_cursor::cursor::ScreenGeometry;
use landmark_cursor::input::{
    parse_resolution, FixedGeometryProvider, LoggingMouseSink, MouseSink, QueuedMouseSink,
    ScreenGeometryProvider, XdotoolMouseSink, XdpyinfoProvider,
};
use landmark_cursor::relay::FrameRelay;
use landmark_cursor::runtime::{Detector, DisplayLoop, FrameLogDisplay, ReplayDetector};
use landmark_cursor::utils::format_user_error;

/// Command-line arguments for landmark-cursor
#[derive(Parser, Debug)]
#[command(name = "landmark-cursor")]
#[command(version, about = "Drive the mouse pointer from hand landmarks", long_about = None)]
pub struct Args {
    /// Configuration file path (defaults are used when omitted)
    #[arg(short, long, env = "LANDMARK_CURSOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON-lines detection recording to replay
    #[arg(short, long, env = "LANDMARK_CURSOR_REPLAY")]
    pub replay: PathBuf,

    /// Pace the replay by its recorded timestamps
    #[arg(long)]
    pub realtime: bool,

    /// Log pointer actions instead of performing them
    #[arg(long)]
    pub dry_run: bool,

    /// Screen size override, e.g. 1920x1080
    #[arg(long, value_parser = parse_screen)]
    pub screen: Option<ScreenGeometry>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty", value_parser = ["json", "pretty", "compact"])]
    pub log_format: String,

    /// Write logs to file (in addition to stdout)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn parse_screen(text: &str) -> std::result::Result<ScreenGeometry, String> {
    parse_resolution(text).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::parse_file(path),
        None => Ok(Config::default_config()),
    };
    let config = match config {
        Ok(c) => c.with_overrides(args.dry_run, args.screen),
        Err(e) => {
            eprintln!("{}", format_user_error(&e));
            return Err(e);
        }
    };

    let _log_guard = init_logging(&args, &config.logging.level)?;

    info!("════════════════════════════════════════════════════════");
    info!("  landmark-cursor v{}", env!("CARGO_PKG_VERSION"));
    info!("  Profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });
    info!("════════════════════════════════════════════════════════");

    if let Err(e) = config.validate() {
        eprintln!("{}", format_user_error(&e));
        return Err(e);
    }
    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    if let Err(e) = run(&args, config).await {
        eprintln!("{}", format_user_error(&e));
        return Err(e);
    }

    info!("landmark-cursor shut down");
    Ok(())
}

async fn run(args: &Args, config: Config) -> Result<()> {
    let mut detector = ReplayDetector::open(&args.replay, args.realtime)
        .with_context(|| format!("Failed to open replay {}", args.replay.display()))?;

    let relay = Arc::new(
        FrameRelay::new(config.relay.effective_capacity())
            .context("Failed to create frame relay")?,
    );

    let control_config = config.control_loop_config();
    let control = match build_sink(&config) {
        Some(sink) => {
            let provider = geometry_provider(&config);
            ControlLoop::new(control_config, provider.as_ref(), sink)
        }
        None => ControlLoop::disabled(control_config),
    };
    let mut handler = DetectionHandler::new(relay.clone(), control);

    let cancel = CancellationToken::new();

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            signal_cancel.cancel();
        }
    });

    let display_cancel = cancel.child_token();
    let display_loop = DisplayLoop::new(relay.clone(), &config.display);
    let display_task = tokio::spawn(async move {
        let mut display = FrameLogDisplay::new();
        display_loop.run(&mut display, display_cancel).await
    });

    let detector_cancel = cancel.clone();
    let detector_task = tokio::task::spawn_blocking(move || {
        let result = detector.run(&mut handler, &detector_cancel);
        handler.shutdown();
        (handler, result)
    });

    let (handler, replay_result) = detector_task.await.context("Detector task panicked")?;
    cancel.cancel();
    let display_stats = display_task.await.context("Display task panicked")?;

    let control_stats = handler.control().stats();
    let out_of_order = handler.out_of_order_events();
    // Dropping the handler drains any queued pointer commands
    drop(handler);

    let summary = replay_result.context("Detection replay failed")?;
    let relay_stats = relay.stats();

    info!(
        "Replay: {} events ({} with hands, {} skipped lines{})",
        summary.events,
        summary.events_with_hands,
        summary.skipped_lines,
        if summary.cancelled { ", cancelled" } else { "" }
    );
    info!(
        "Control: {} frames, {} tracking, {} skipped, {} positions, {} presses, {} releases, {} sink failures, {} out of order",
        control_stats.frames,
        control_stats.tracking_frames,
        control_stats.skipped_frames,
        control_stats.positions_emitted,
        control_stats.presses,
        control_stats.releases,
        control_stats.sink_failures,
        out_of_order
    );
    info!(
        "Relay: {} pushed, {} shown, {} dropped ({:.1}%); display polled {} times",
        relay_stats.frames_pushed,
        display_stats.frames_shown,
        relay_stats.frames_dropped,
        relay_stats.drop_rate() * 100.0,
        display_stats.polls
    );

    Ok(())
}

fn geometry_provider(config: &Config) -> Box<dyn ScreenGeometryProvider> {
    match config.screen.geometry() {
        Some(geometry) => {
            info!(
                "Using configured screen size {}x{}",
                geometry.width(),
                geometry.height()
            );
            Box::new(FixedGeometryProvider::new(geometry))
        }
        None => Box::new(XdpyinfoProvider::new()),
    }
}

/// Build the configured sink; `None` disables cursor control
fn build_sink(config: &Config) -> Option<Box<dyn MouseSink>> {
    if !config.control.enable_mouse_control {
        info!("Mouse control is disabled by configuration");
        return None;
    }

    let inner: Box<dyn MouseSink> = match config.sink.backend {
        SinkBackend::Log => {
            info!("Dry run: pointer actions are logged only");
            Box::new(LoggingMouseSink::new())
        }
        SinkBackend::Xdotool => match XdotoolMouseSink::probe() {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                warn!("{}; mouse control disabled", e);
                return None;
            }
        },
    };

    if config.sink.queue_depth == 0 {
        return Some(inner);
    }

    match QueuedMouseSink::spawn(inner, config.sink.queue_depth) {
        Ok(queued) => Some(Box::new(queued)),
        Err(e) => {
            warn!("Failed to start mouse sink worker ({}); mouse control disabled", e);
            None
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn init_logging(args: &Args, configured_level: &str) -> Result<Option<WorkerGuard>> {
    let log_level = match args.verbose {
        0 => configured_level,
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("landmark_cursor={},warn", log_level))
    });

    let mut layers: Vec<BoxedLayer> = Vec::new();

    layers.push(match args.log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().boxed(),
        "compact" => tracing_subscriber::fmt::layer().compact().boxed(),
        _ => tracing_subscriber::fmt::layer().pretty().boxed(),
    });

    // If log file is specified, write to both stdout and file
    let guard = match &args.log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            layers.push(match args.log_format.as_str() {
                "json" => file_layer.json().boxed(),
                "compact" => file_layer.compact().boxed(),
                _ => file_layer.boxed(),
            });
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    if let Some(path) = &args.log_file {
        info!("Logging to file: {}", path.display());
    }

    Ok(guard)
}

//! chatface daemon
//!
//! Host simulator for the chatface display: brings up a simulated board,
//! plays the boot logo, animates the face and serves a JSON control API.

mod config;
mod rendering;
mod state;
mod surface;
mod timer;
mod web;

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;
use timer::{TimerFailure, TokioTimerDriver};

#[derive(Parser, Debug)]
#[command(name = "chatfaced", version, about = "chatface display simulator")]
struct Args {
    /// Configuration file
    #[arg(default_value = "config/default.toml")]
    config: PathBuf,

    /// Board variant, overriding the configuration
    #[arg(long)]
    variant: Option<String>,

    /// Write the effective configuration to a file and exit
    #[arg(long, value_name = "PATH")]
    save_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = if args.config.exists() {
        let config = Config::load(&args.config).context("Failed to load configuration")?;
        info!("Loaded configuration from: {}", args.config.display());
        config
    } else {
        warn!(
            "Configuration {} not found, using defaults",
            args.config.display()
        );
        Config::default()
    };
    if let Some(variant) = args.variant {
        config.variant = variant;
    }
    if let Some(path) = args.save_config {
        config.save(&path)?;
        info!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel::<TimerFailure>();
    let timers = Arc::new(TokioTimerDriver::new(fatal_tx));
    let state = Arc::new(AppState::new(config.clone(), timers)?);

    let render_state = state.clone();
    let render_interval = config.render_interval();
    tokio::spawn(async move {
        render_loop(render_state, render_interval).await;
    });

    let power_state = state.clone();
    tokio::spawn(async move {
        power_loop(power_state).await;
    });

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    let server = async {
        if config.web.enable {
            let app = web::create_router(state.clone());
            let addr: SocketAddr = config
                .web
                .listen
                .parse()
                .context("Invalid listen address")?;
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!("Web server listening on http://{}", addr);
            axum::serve(listener, app).await?;
        } else {
            info!("Web server disabled");
            std::future::pending::<()>().await;
        }
        anyhow::Ok(())
    };

    let result = tokio::select! {
        result = server => result,
        failure = fatal_rx.recv() => match failure {
            Some(failure) => {
                error!("{} failed, shutting down", failure.timer);
                Err(anyhow::Error::from(failure.error).context(format!("{} failed", failure.timer)))
            }
            None => Ok(()),
        },
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
            Ok(())
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
            Ok(())
        }
    };

    state.shutdown();
    result
}

/// Rate-limits repeated error logs to one per minute.
struct ErrorThrottle {
    what: &'static str,
    consecutive: u32,
    last_log: Instant,
}

impl ErrorThrottle {
    fn new(what: &'static str) -> Self {
        Self {
            what,
            consecutive: 0,
            last_log: Instant::now(),
        }
    }

    fn record(&mut self, result: Result<()>) {
        let Err(e) = result else {
            self.consecutive = 0;
            return;
        };
        self.consecutive += 1;
        let elapsed = self.last_log.elapsed();
        if self.consecutive == 1 || elapsed >= Duration::from_secs(60) {
            if self.consecutive > 1 {
                warn!(
                    "{} error (repeated {} times in {:?}): {:#}",
                    self.what, self.consecutive, elapsed, e
                );
            } else {
                warn!("{} error: {:#}", self.what, e);
            }
            self.last_log = Instant::now();
            self.consecutive = 0;
        }
    }
}

async fn render_loop(state: Arc<AppState>, interval: Duration) {
    let mut errors = ErrorThrottle::new("Render");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        errors.record(state.render().map(|_| ()));
    }
}

async fn power_loop(state: Arc<AppState>) {
    let mut errors = ErrorThrottle::new("Power save");
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        errors.record(state.power_tick().map(|_| ()));
    }
}

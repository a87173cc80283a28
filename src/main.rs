//! Vanira - a single-channel IRC bot.
//!
//! Joins one channel, keeps the link alive, gives channel operator status to
//! known hostmasks and answers CTCP VERSION. SIGUSR1 replaces the running
//! binary without dropping the connection.

mod config;
mod control;
mod error;
mod event_loop;
mod handlers;
mod invocation;
mod network;

use crate::config::{Config, OperList};
use crate::control::{Controller, ShutdownKind};
use crate::event_loop::{EventLoop, Exit};
use crate::handlers::Dispatcher;
use crate::invocation::Invocation;
use crate::network::{Connection, reexec};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Answer to CTCP VERSION.
const VERSION: &str = concat!("Vanira ", env!("CARGO_PKG_VERSION"));

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "VANIRA_CONFIG";
const DEFAULT_CONFIG: &str = "vanira.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Before anything slow, so an early signal is recorded instead of taking
    // the default action and dropping an inherited connection.
    let control = Controller::new();
    let _signals = control.install()?;

    let invocation = Invocation::from_args(std::env::args().skip(1)).map_err(|e| {
        error!(error = %e, "Bad invocation");
        e
    })?;

    // Load configuration
    let config_path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path.display(), error = %e, "Failed to load config");
        e
    })?;

    let opers = OperList::load(&config.master, &config.opers);

    info!(
        version = VERSION,
        nick = %config.nick,
        channel = %config.channel,
        server = %config.server,
        port = config.port,
        opers = opers.len(),
        "Starting vanira"
    );

    let dispatcher = Dispatcher::new(config.identity(), opers, VERSION);
    let endpoint = config.endpoint();
    let timeouts = &config.timeouts;

    let mut resumed = match invocation {
        Invocation::Cold => None,
        Invocation::Warm(token) => Some(token.resume().map_err(|e| {
            error!(fd = token.fd(), error = %e, "Cannot resume");
            e
        })?),
    };

    loop {
        let event_loop = match resumed.take() {
            Some(conn) => EventLoop::resume(
                conn,
                &dispatcher,
                &control,
                timeouts.idle(),
                timeouts.quit(),
            ),
            None => {
                let opened = tokio::select! {
                    biased;
                    kind = shutdown_requested(&control) => {
                        shutdown(kind, None, timeouts.quit()).await;
                        continue;
                    }
                    opened = Connection::open(&endpoint, dispatcher.identity()) => opened,
                };
                match opened {
                    Ok(conn) => EventLoop::new(
                        conn,
                        &dispatcher,
                        &control,
                        timeouts.idle(),
                        timeouts.quit(),
                    ),
                    Err(e) => {
                        warn!(error = %e, "Connection attempt failed");
                        retry_pause(&control, timeouts.reconnect(), timeouts.quit()).await;
                        continue;
                    }
                }
            }
        };

        match event_loop.run().await {
            Exit::Disconnected => {
                debug!(counts = ?dispatcher.registry().get_command_stats(), "Commands handled");
                retry_pause(&control, timeouts.reconnect(), timeouts.quit()).await;
            }
            Exit::Shutdown(kind, conn) => shutdown(kind, Some(conn), timeouts.quit()).await,
            Exit::Reload(conn) => match reload(conn) {
                Ok(conn) => resumed = Some(conn),
                Err(e) => {
                    warn!(error = %e, "Connection lost during reload");
                    retry_pause(&control, timeouts.reconnect(), timeouts.quit()).await;
                }
            },
        }
    }
}

/// Wait out the reconnect delay. A shutdown request ends the process right
/// away; a reload request is meaningless without a connection and is dropped.
async fn retry_pause(control: &Controller, delay: Duration, grace: Duration) {
    info!(delay_secs = delay.as_secs(), "Reconnecting after delay");
    let deadline = Instant::now() + delay;
    loop {
        if let Some(kind) = control.shutdown() {
            shutdown(kind, None, grace).await;
        }
        if control.take_reload() {
            warn!("Reload requested while disconnected, ignoring");
        }
        tokio::select! {
            () = tokio::time::sleep_until(deadline) => break,
            () = control.interrupted() => {}
        }
    }
    if let Some(kind) = control.shutdown() {
        shutdown(kind, None, grace).await;
    }
}

/// Resolves once a shutdown has been requested. Reload requests only wake it.
async fn shutdown_requested(control: &Controller) -> ShutdownKind {
    loop {
        if let Some(kind) = control.shutdown() {
            return kind;
        }
        control.interrupted().await;
    }
}

/// Say goodbye, give the server `grace` to close the link, and exit.
///
/// Both the QUIT write and the wait for the server's close are bounded by
/// `grace`, so a stalled peer cannot keep the process alive.
async fn shutdown(kind: ShutdownKind, conn: Option<Connection>, grace: Duration) {
    info!(reason = kind.reason(), "Shutting down");
    if let Some(mut conn) = conn {
        conn.quit(kind.reason(), grace).await;
        if !conn.wait_closed(grace).await {
            debug!(grace_secs = grace.as_secs(), "Server did not close the link in time");
        }
        conn.disconnect().await;
    }
    std::process::exit(kind.exit_code());
}

/// Re-exec with the live connection. Only returns if the exec failed, handing
/// the connection back so this image can keep serving it.
fn reload(conn: Connection) -> std::io::Result<Connection> {
    info!("Reloading");
    let stream = conn.into_std()?;
    let err = reexec(&stream);
    error!(error = %err, "Re-exec failed, continuing with the current binary");
    Connection::new(tokio::net::TcpStream::from_std(stream)?)
}

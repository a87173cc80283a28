//! The per-connection event loop.
//!
//! ```text
//!   ┌──────────▶ WAITING ── idle timeout ──▶ QUIT, TERMINATED
//!   │               │ readable
//!   │               ▼
//!   │            READING ── EOF / error ──▶ TERMINATED
//!   │               │
//!   │               ▼
//!   └──────── DISPATCHING (one reply per line, in order)
//! ```
//!
//! Pending shutdown and reload requests are only looked at before WAITING,
//! i.e. after every complete line of the last read has been dispatched.

use std::time::Duration;

use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, trace, warn};

use crate::control::{Controller, ShutdownKind};
use crate::error::SendError;
use crate::handlers::Dispatcher;
use crate::network::Connection;

/// Why the event loop gave up its connection.
#[derive(Debug)]
pub enum Exit {
    /// The link is gone (EOF, I/O error or idle timeout). Reconnect.
    Disconnected,
    /// A reload was requested and the read buffer is drained.
    Reload(Connection),
    /// A shutdown was requested.
    Shutdown(ShutdownKind, Connection),
}

enum Wake {
    Signal,
    Ready(std::io::Result<()>),
    Idle,
}

/// Owns one connection from registration (or resume) until it ends.
pub struct EventLoop<'a> {
    conn: Connection,
    dispatcher: &'a Dispatcher,
    control: &'a Controller,
    idle: Duration,
    grace: Duration,
}

impl<'a> EventLoop<'a> {
    /// Drive a freshly registered connection. `grace` bounds the farewell
    /// QUIT sent on idle timeout.
    pub fn new(
        conn: Connection,
        dispatcher: &'a Dispatcher,
        control: &'a Controller,
        idle: Duration,
        grace: Duration,
    ) -> Self {
        Self {
            conn,
            dispatcher,
            control,
            idle,
            grace,
        }
    }

    /// Drive a connection inherited from the previous process image.
    /// Registration already happened there, so nothing is sent up front.
    pub fn resume(
        conn: Connection,
        dispatcher: &'a Dispatcher,
        control: &'a Controller,
        idle: Duration,
        grace: Duration,
    ) -> Self {
        info!(server = %conn.peer(), nick = %dispatcher.identity().nick, "Resuming session");
        Self::new(conn, dispatcher, control, idle, grace)
    }

    pub async fn run(mut self) -> Exit {
        let mut deadline = Instant::now() + self.idle;

        loop {
            if let Some(kind) = self.control.shutdown() {
                return Exit::Shutdown(kind, self.conn);
            }
            if self.control.reload_pending() {
                if self.conn.is_drained() {
                    self.control.take_reload();
                    return Exit::Reload(self.conn);
                }
                debug!(
                    buffered = self.conn.buffered(),
                    "Reload deferred until the partial line completes"
                );
            }

            // WAITING
            let wake = tokio::select! {
                biased;
                () = self.control.interrupted() => Wake::Signal,
                ready = timeout_at(deadline, self.conn.readable()) => match ready {
                    Ok(ready) => Wake::Ready(ready),
                    Err(_) => Wake::Idle,
                },
            };

            match wake {
                Wake::Signal => continue,
                Wake::Idle => {
                    warn!(
                        idle_secs = self.idle.as_secs(),
                        "No data from server, dropping connection"
                    );
                    self.conn.quit("Connection timed out", self.grace).await;
                    self.conn.disconnect().await;
                    return Exit::Disconnected;
                }
                Wake::Ready(Err(e)) => {
                    warn!(error = %e, "Waiting for data failed");
                    self.conn.disconnect().await;
                    return Exit::Disconnected;
                }
                Wake::Ready(Ok(())) => {}
            }

            // READING
            match self.conn.try_fill() {
                Ok(0) => {
                    info!("Server closed the connection");
                    self.conn.disconnect().await;
                    return Exit::Disconnected;
                }
                Ok(n) => {
                    trace!(bytes = n, "Read");
                    deadline = Instant::now() + self.idle;
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
                Err(e) => {
                    warn!(error = %e, "Read failed");
                    self.conn.disconnect().await;
                    return Exit::Disconnected;
                }
            }

            // DISPATCHING
            while let Some(line) = self.conn.next_line() {
                let Some(reply) = self.dispatcher.dispatch(&line) else {
                    continue;
                };
                match self.conn.send(&reply).await {
                    Ok(()) => {}
                    Err(SendError::Encode(e)) => {
                        warn!(command = reply.name(), error = %e, "Reply not sent");
                    }
                    Err(SendError::Io(e)) => {
                        warn!(error = %e, "Write failed");
                        self.conn.disconnect().await;
                        return Exit::Disconnected;
                    }
                }
            }
        }
    }
}

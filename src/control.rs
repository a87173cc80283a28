//! Signal-driven shutdown and reload requests.
//!
//! Signal delivery never touches the connection. The signal task only records
//! what was asked for and wakes the event loop, which acts on it at the next
//! line boundary.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Why the process is going away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ShutdownKind {
    /// SIGHUP
    Hangup = 1,
    /// SIGINT
    Interrupt = 2,
    /// SIGTERM
    Terminate = 3,
    /// SIGQUIT, the catchable core-dump signal.
    Crash = 4,
    /// Any other termination request.
    Other = 5,
}

impl ShutdownKind {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Hangup),
            2 => Some(Self::Interrupt),
            3 => Some(Self::Terminate),
            4 => Some(Self::Crash),
            5 => Some(Self::Other),
            _ => None,
        }
    }

    /// Text sent to the server in the farewell QUIT.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Hangup => "Terminal hangup",
            Self::Interrupt => "Keyboard interrupt",
            Self::Terminate => "Caught termination signal",
            Self::Crash => "Caught quit signal, core dump requested",
            Self::Other => "Shutting down",
        }
    }

    /// Process exit status once the farewell is done.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Crash => 139,
            _ => 0,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    reload: AtomicBool,
    shutdown: AtomicU8,
    wake: Notify,
}

/// Pending-action flags shared between the signal task and the event loop.
///
/// Cloning is cheap; all clones observe the same flags.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    inner: Arc<Inner>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a hot reload at the next safe point.
    pub fn request_reload(&self) {
        self.inner.reload.store(true, Ordering::SeqCst);
        self.inner.wake.notify_one();
    }

    /// Ask for a shutdown. The first request wins; later ones only wake.
    pub fn request_shutdown(&self, kind: ShutdownKind) {
        let _ = self.inner.shutdown.compare_exchange(
            0,
            kind as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        self.inner.wake.notify_one();
    }

    /// The pending shutdown, if any. Not cleared: shutdown is terminal.
    pub fn shutdown(&self) -> Option<ShutdownKind> {
        ShutdownKind::from_u8(self.inner.shutdown.load(Ordering::SeqCst))
    }

    pub fn reload_pending(&self) -> bool {
        self.inner.reload.load(Ordering::SeqCst)
    }

    /// Consume a pending reload request. Returns whether one was pending.
    pub fn take_reload(&self) -> bool {
        self.inner.reload.swap(false, Ordering::SeqCst)
    }

    /// Resolves after the next request. A request made while nobody was
    /// waiting is remembered, so the next call returns immediately.
    pub async fn interrupted(&self) {
        self.inner.wake.notified().await;
    }

    /// Route process signals into this controller.
    ///
    /// Must be called from within the runtime. Registration failures are
    /// returned; once running, the task lives as long as the runtime.
    pub fn install(&self) -> io::Result<JoinHandle<()>> {
        let mut hangup = signal(SignalKind::hangup())?;
        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        let mut quit = signal(SignalKind::quit())?;
        let mut alarm = signal(SignalKind::alarm())?;
        let mut reload = signal(SignalKind::user_defined1())?;

        let control = self.clone();
        Ok(tokio::spawn(async move {
            loop {
                let kind = tokio::select! {
                    Some(()) = hangup.recv() => ShutdownKind::Hangup,
                    Some(()) = interrupt.recv() => ShutdownKind::Interrupt,
                    Some(()) = terminate.recv() => ShutdownKind::Terminate,
                    Some(()) = quit.recv() => ShutdownKind::Crash,
                    Some(()) = alarm.recv() => ShutdownKind::Other,
                    Some(()) = reload.recv() => {
                        info!("Reload requested");
                        control.request_reload();
                        continue;
                    }
                    else => break,
                };
                info!(reason = kind.reason(), "Shutdown requested");
                control.request_shutdown(kind);
            }
            debug!("Signal streams closed");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_reasons_and_exit_codes() {
        assert_eq!(ShutdownKind::Hangup.reason(), "Terminal hangup");
        assert_eq!(ShutdownKind::Interrupt.reason(), "Keyboard interrupt");
        assert_eq!(ShutdownKind::Terminate.reason(), "Caught termination signal");
        assert_eq!(
            ShutdownKind::Crash.reason(),
            "Caught quit signal, core dump requested"
        );
        assert_eq!(ShutdownKind::Crash.exit_code(), 139);
        assert_eq!(ShutdownKind::Terminate.exit_code(), 0);
        assert_eq!(ShutdownKind::Other.exit_code(), 0);
    }

    #[test]
    fn test_first_shutdown_wins() {
        let control = Controller::new();
        assert_eq!(control.shutdown(), None);
        control.request_shutdown(ShutdownKind::Interrupt);
        control.request_shutdown(ShutdownKind::Crash);
        assert_eq!(control.shutdown(), Some(ShutdownKind::Interrupt));
    }

    #[test]
    fn test_reload_is_consumed_once() {
        let control = Controller::new();
        assert!(!control.take_reload());
        control.clone().request_reload();
        assert!(control.reload_pending());
        assert!(control.take_reload());
        assert!(!control.reload_pending());
    }

    #[tokio::test]
    async fn test_request_before_wait_is_remembered() {
        let control = Controller::new();
        control.request_reload();
        tokio::time::timeout(Duration::from_secs(1), control.interrupted())
            .await
            .expect("stored wake-up should resolve immediately");
    }

    #[tokio::test]
    async fn test_installed_handler_routes_usr1() {
        let control = Controller::new();
        let _task = control.install().unwrap();
        nix::sys::signal::raise(nix::sys::signal::Signal::SIGUSR1).unwrap();
        tokio::time::timeout(Duration::from_secs(5), control.interrupted())
            .await
            .expect("signal should wake the controller");
        assert!(control.take_reload());
        assert_eq!(control.shutdown(), None);
    }
}

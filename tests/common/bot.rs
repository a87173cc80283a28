//! Bot process management.
//!
//! Spawns the `vanira` binary with a throwaway config and oper file.

use nix::sys::signal::{Signal, kill};
use nix::sys::stat::Mode;
use nix::unistd::{Pid, mkfifo};
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// A running bot process.
pub struct TestBot {
    child: Child,
    dir: TempDir,
}

impl TestBot {
    /// Spawn the bot against `127.0.0.1:port`. `opers` is written to the oper file.
    pub fn spawn(port: u16, opers: &str) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("opers"), opers)?;
        Self::launch(port, dir)
    }

    /// Spawn with the oper file replaced by a FIFO. Startup stalls reading it
    /// until [`release_opers`](Self::release_opers) opens the write end.
    #[allow(dead_code)]
    pub fn spawn_stalled(port: u16) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        mkfifo(dir.path().join("opers").as_path(), Mode::S_IRUSR | Mode::S_IWUSR)?;
        Self::launch(port, dir)
    }

    fn launch(port: u16, dir: TempDir) -> anyhow::Result<Self> {
        let opers_path = dir.path().join("opers");
        let config_path = dir.path().join("vanira.toml");
        let config = format!(
            r##"
master = "owner!boss@home.example"
nick = "vanira"
channel = "#vanira"
server = "127.0.0.1"
port = {port}
opers = "{}"

[timeouts]
idle = 30
reconnect = 1
quit = 2
"##,
            opers_path.display()
        );
        std::fs::write(&config_path, config)?;

        let child = Command::new(env!("CARGO_BIN_EXE_vanira"))
            .env("VANIRA_CONFIG", &config_path)
            .env("RUST_LOG", "debug")
            .spawn()?;

        Ok(Self { child, dir })
    }

    /// Feed the FIFO created by [`spawn_stalled`](Self::spawn_stalled).
    #[allow(dead_code)]
    pub fn release_opers(&self, opers: &str) -> anyhow::Result<()> {
        let mut fifo = std::fs::OpenOptions::new()
            .write(true)
            .open(self.dir.path().join("opers"))?;
        fifo.write_all(opers.as_bytes())?;
        Ok(())
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn signal(&self, signal: Signal) -> anyhow::Result<()> {
        kill(Pid::from_raw(self.child.id() as i32), signal)?;
        Ok(())
    }

    /// Arguments of the current process image, without `argv[0]`.
    #[allow(dead_code)]
    pub fn args(&self) -> anyhow::Result<Vec<String>> {
        let path = Path::new("/proc").join(self.pid().to_string()).join("cmdline");
        let cmdline = std::fs::read(path)?;
        Ok(cmdline
            .split(|&b| b == 0)
            .filter(|arg| !arg.is_empty())
            .skip(1)
            .map(|arg| String::from_utf8_lossy(arg).into_owned())
            .collect())
    }

    /// Wait until the process has re-executed itself with an inherited
    /// descriptor, and return that descriptor number.
    #[allow(dead_code)]
    pub async fn wait_reexec(&self, dur: Duration) -> anyhow::Result<i32> {
        let step = Duration::from_millis(50);
        let mut waited = Duration::ZERO;
        while waited < dur {
            // The cmdline is briefly unreadable while the exec is in progress.
            if let Ok([fd]) = self.args().as_deref() {
                return Ok(fd.parse()?);
            }
            sleep(step).await;
            waited += step;
        }
        anyhow::bail!("bot did not re-exec within {dur:?}")
    }

    /// Wait for the process to exit.
    pub async fn wait(&mut self, dur: Duration) -> anyhow::Result<ExitStatus> {
        let step = Duration::from_millis(50);
        let mut waited = Duration::ZERO;
        while waited < dur {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            sleep(step).await;
            waited += step;
        }
        anyhow::bail!("bot did not exit within {dur:?}")
    }
}

impl Drop for TestBot {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

//! Fake IRC server.

use socket2::{Domain, Socket, Type};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

/// A listening socket the bot connects to.
pub struct FakeServer {
    listener: TcpListener,
}

impl FakeServer {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or_default()
    }

    /// Wait for the bot to connect.
    pub async fn accept(&self) -> anyhow::Result<BotLink> {
        let (stream, _) = timeout(Duration::from_secs(10), self.listener.accept()).await??;
        let (read_half, write_half) = stream.into_split();
        Ok(BotLink {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Assert that no new connection shows up within `dur`.
    pub async fn expect_no_connection(&self, dur: Duration) -> anyhow::Result<()> {
        match timeout(dur, self.listener.accept()).await {
            Err(_) => Ok(()),
            Ok(_) => anyhow::bail!("bot opened an unexpected second connection"),
        }
    }
}

/// A listener whose accept queue is already full, so a new connect hangs
/// until the kernel gives up on it.
pub struct StalledServer {
    _socket: Socket,
    _queued: Vec<std::net::TcpStream>,
    port: u16,
}

impl StalledServer {
    #[allow(dead_code)]
    pub fn bind() -> anyhow::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, None)?;
        socket.bind(&SocketAddr::from((Ipv4Addr::LOCALHOST, 0)).into())?;
        socket.listen(0)?;
        let addr = socket
            .local_addr()?
            .as_socket()
            .ok_or_else(|| anyhow::anyhow!("listener has no inet address"))?;

        // Never accepted: connects succeed until the queue is full.
        let mut queued = Vec::new();
        for _ in 0..8 {
            match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(300)) {
                Ok(stream) => queued.push(stream),
                Err(_) => break,
            }
        }
        Ok(Self {
            _socket: socket,
            _queued: queued,
            port: addr.port(),
        })
    }

    #[allow(dead_code)]
    pub fn port(&self) -> u16 {
        self.port
    }
}

/// The server side of one bot connection.
pub struct BotLink {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl BotLink {
    /// Send a raw line to the bot, appending CRLF if missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send bytes as-is, without adding a terminator.
    pub async fn send_bytes(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(data).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive one line from the bot, terminator stripped.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("bot closed the connection");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }

    /// Read the registration burst and return the lines (PASS?, NICK, USER).
    pub async fn expect_registration(&mut self) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = line.starts_with("USER ");
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Assert the bot sends nothing within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        match self.recv_timeout(dur).await {
            Ok(line) => anyhow::bail!("unexpected line from bot: {line:?}"),
            Err(_) => Ok(()),
        }
    }

    /// Wait until the bot closes its side.
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if timeout(Duration::from_secs(10), self.reader.read_line(&mut line)).await?? == 0 {
                return Ok(());
            }
        }
    }
}

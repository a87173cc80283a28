//! Connection - one live link to the IRC server.
//!
//! ```text
//!   OwnedReadHalf ──try_read──▶ LineBuffer (512 B) ──next_line──▶ event loop
//!   event loop ──send(Command)──▶ BufWriter<OwnedWriteHalf> ──flush──▶ server
//! ```
//!
//! The read side is driven by the event loop one readiness event at a time so
//! that a pending reload can be checked between reads. Every outbound command
//! is flushed before `send` returns.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpSocket, TcpStream, lookup_host};
use tracing::{debug, info, warn};
use vanira_proto::{Command, LineBuffer};

use crate::config::{Endpoint, Identity};
use crate::error::{ConnectError, SendError};

/// A registered (or resumed) connection to the server.
pub struct Connection {
    reader: OwnedReadHalf,
    writer: BufWriter<OwnedWriteHalf>,
    buffer: LineBuffer,
    peer: SocketAddr,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.peer)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Wrap an already connected stream.
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        let peer = stream.peer_addr()?;
        if let Err(e) = enable_keepalive(&stream) {
            warn!(error = %e, "Failed to enable TCP keepalive");
        }
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader,
            writer: BufWriter::new(writer),
            buffer: LineBuffer::new(),
            peer,
        })
    }

    /// Connect to `endpoint` and register as `identity`.
    pub async fn open(endpoint: &Endpoint, identity: &Identity) -> Result<Self, ConnectError> {
        let mut conn = Self::connect(endpoint).await?;
        conn.register(identity).await?;
        Ok(conn)
    }

    /// Resolve the server, then try each address in order until one connects.
    ///
    /// A configured bind address is resolved once up front. Failing to bind
    /// ends the whole attempt; failing to connect moves on to the next address.
    pub async fn connect(endpoint: &Endpoint) -> Result<Self, ConnectError> {
        let candidates: Vec<SocketAddr> = lookup_host((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|source| ConnectError::Resolve {
                host: endpoint.host.clone(),
                port: endpoint.port,
                source,
            })?
            .collect();

        if candidates.is_empty() {
            return Err(ConnectError::NoAddresses {
                host: endpoint.host.clone(),
                port: endpoint.port,
            });
        }

        let local = match endpoint.bind.as_deref() {
            Some(addr) => Some(resolve_bind(addr).await?),
            None => None,
        };

        let mut last = None;
        for addr in &candidates {
            let socket = if addr.is_ipv4() {
                TcpSocket::new_v4()
            } else {
                TcpSocket::new_v6()
            };
            let socket = match socket {
                Ok(socket) => socket,
                Err(e) => {
                    warn!(server = %addr, error = %e, "Failed to create socket");
                    last = Some(e);
                    continue;
                }
            };

            if let Some(local) = local {
                socket
                    .bind(local)
                    .map_err(|source| ConnectError::Bind { addr: local, source })?;
            }

            debug!(server = %addr, "Connecting");
            match socket.connect(*addr).await.and_then(Self::new) {
                Ok(conn) => {
                    info!(server = %addr, "Connected");
                    return Ok(conn);
                }
                Err(e) => {
                    warn!(server = %addr, error = %e, "Connection attempt failed");
                    last = Some(e);
                }
            }
        }

        Err(ConnectError::Exhausted {
            attempts: candidates.len(),
            last: last.unwrap_or_else(|| io::Error::other("no address was tried")),
        })
    }

    /// Send the registration burst: optional PASS, then NICK and USER.
    pub async fn register(&mut self, identity: &Identity) -> Result<(), SendError> {
        if let Some(password) = &identity.password {
            self.send(&Command::PASS(password.clone())).await?;
        }
        self.send(&Command::NICK(identity.nick.clone())).await?;
        self.send(&Command::USER(
            identity.username.clone(),
            identity.realname.clone(),
        ))
        .await?;
        info!(nick = %identity.nick, "Registration sent");
        Ok(())
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Encode, write and flush one command.
    pub async fn send(&mut self, command: &Command) -> Result<(), SendError> {
        let line = command.encode()?;
        debug!(line = %line.trim_end(), "->");
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Wait until the socket has data (or EOF, or an error) to read.
    pub async fn readable(&self) -> io::Result<()> {
        self.reader.readable().await
    }

    /// One non-blocking read into the spare buffer capacity.
    ///
    /// `Ok(0)` means the server closed the link. `WouldBlock` means the
    /// readiness was spurious and the caller should wait again.
    pub fn try_fill(&mut self) -> io::Result<usize> {
        let n = self.reader.try_read(self.buffer.spare_mut())?;
        self.buffer.commit(n);
        Ok(n)
    }

    /// Next complete line from the read buffer.
    pub fn next_line(&mut self) -> Option<String> {
        self.buffer.next_line()
    }

    /// No partial line is waiting for more bytes.
    pub fn is_drained(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Send `QUIT`, giving up after `limit`. Failures are logged, not returned.
    pub async fn quit(&mut self, reason: &str, limit: Duration) {
        let quit = Command::QUIT(Some(reason.to_owned()));
        match tokio::time::timeout(limit, self.send(&quit)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "QUIT not delivered"),
            Err(_) => debug!(limit_ms = limit.as_millis() as u64, "QUIT not delivered in time"),
        }
    }

    /// Discard inbound data until the server closes the link or `grace` runs out.
    pub async fn wait_closed(&mut self, grace: Duration) -> bool {
        let mut scratch = [0u8; 512];
        let drained = tokio::time::timeout(grace, async {
            loop {
                match self.reader.read(&mut scratch).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await;
        drained.is_ok()
    }

    /// Close the write half, then drop the socket.
    ///
    /// Bytes left in the write buffer by an abandoned send are dropped rather
    /// than flushed, so this never waits on the peer.
    pub async fn disconnect(mut self) {
        if !self.writer.buffer().is_empty() {
            debug!(dropped = self.writer.buffer().len(), "Discarding unsent output");
        }
        if let Err(e) = self.writer.get_mut().shutdown().await {
            debug!(error = %e, "Error closing write half");
        }
        info!(server = %self.peer, "Disconnected");
    }

    /// Give up async ownership of the socket so it can outlive this process image.
    ///
    /// The write buffer is always empty here because `send` flushes. Any
    /// buffered partial line is lost, so callers check [`is_drained`] first.
    ///
    /// [`is_drained`]: Self::is_drained
    pub fn into_std(self) -> io::Result<std::net::TcpStream> {
        let Self { reader, writer, .. } = self;
        let stream = reader
            .reunite(writer.into_inner())
            .map_err(io::Error::other)?;
        stream.into_std()
    }
}

/// Resolve a bind address. Literal IPs skip the resolver.
async fn resolve_bind(addr: &str) -> Result<SocketAddr, ConnectError> {
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, 0));
    }
    let resolve_err = |source| ConnectError::BindResolve {
        addr: addr.to_owned(),
        source,
    };
    lookup_host((addr, 0))
        .await
        .map_err(resolve_err)?
        .next()
        .ok_or_else(|| resolve_err(io::Error::new(io::ErrorKind::NotFound, "no addresses")))
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}

//! Handing the live socket to the next process image.
//!
//! The outgoing generation clears close-on-exec on the socket and execs its
//! own executable with the descriptor number as the only argument. The
//! incoming generation turns that number back into a [`Connection`] without
//! reconnecting or re-registering.

use std::fmt;
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::process::CommandExt;
use std::str::FromStr;

use socket2::{SockRef, Type};
use tracing::info;

use super::Connection;
use crate::error::StartupError;

/// Descriptor number of an inherited server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeToken(RawFd);

impl ResumeToken {
    pub fn of(stream: &std::net::TcpStream) -> Self {
        Self(stream.as_raw_fd())
    }

    pub fn fd(self) -> RawFd {
        self.0
    }

    /// Take ownership of the inherited descriptor and wrap it as a connection.
    ///
    /// The descriptor is only claimed once it is known to be a connected
    /// TCP socket; anything else is left open and untouched.
    ///
    /// Must be called from within the runtime.
    #[allow(unsafe_code)]
    pub fn resume(self) -> Result<Connection, StartupError> {
        // SAFETY: the borrow ends with this function's checks, and every
        // check is a plain syscall that fails cleanly on a bad descriptor.
        let borrowed = unsafe { BorrowedFd::borrow_raw(self.0) };
        check_connected_tcp(borrowed).map_err(StartupError::Resume)?;

        // SAFETY: the previous generation passed us this connected socket
        // after clearing close-on-exec on it, and nothing else in this
        // process has claimed it. We take sole ownership here.
        let fd = unsafe { OwnedFd::from_raw_fd(self.0) };
        let stream = std::net::TcpStream::from(fd);
        attach(stream).map_err(StartupError::Resume)
    }
}

/// Fails with ENOTSOCK / ENOTCONN / EBADF for anything but a connected
/// stream socket with an inet peer.
fn check_connected_tcp(fd: BorrowedFd<'_>) -> io::Result<()> {
    let sock = SockRef::from(&fd);
    if sock.r#type()? != Type::STREAM {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a stream socket"));
    }
    match sock.peer_addr()?.as_socket() {
        Some(_) => Ok(()),
        None => Err(io::Error::new(io::ErrorKind::InvalidInput, "not an inet socket")),
    }
}

fn attach(stream: std::net::TcpStream) -> io::Result<Connection> {
    let peer = stream.peer_addr()?;
    SockRef::from(&stream).set_cloexec(true)?;
    stream.set_nonblocking(true)?;
    let conn = Connection::new(tokio::net::TcpStream::from_std(stream)?)?;
    info!(server = %peer, "Resumed inherited connection");
    Ok(conn)
}

impl FromStr for ResumeToken {
    type Err = StartupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<RawFd>() {
            Ok(fd) if fd > 0 => Ok(Self(fd)),
            _ => Err(StartupError::BadResumeToken(s.to_owned())),
        }
    }
}

impl fmt::Display for ResumeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Replace this process image with a fresh copy of the running executable
/// that inherits `stream`.
///
/// Only returns on failure. The descriptor is made close-on-exec again
/// before returning so the caller can keep using the stream.
pub fn reexec(stream: &std::net::TcpStream) -> io::Error {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => return e,
    };
    let sock = SockRef::from(stream);
    if let Err(e) = sock.set_cloexec(false) {
        return e;
    }

    let token = ResumeToken::of(stream);
    info!(exe = %exe.display(), fd = %token, "Re-executing");
    let err = std::process::Command::new(&exe).arg(token.to_string()).exec();

    let _ = sock.set_cloexec(true);
    err
}

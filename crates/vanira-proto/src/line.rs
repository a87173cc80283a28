//! Fixed-capacity CRLF line framer.
//!
//! Bytes read from the socket are appended to a 512 byte buffer and complete
//! lines are pulled off the front. Two offsets describe the buffer:
//!
//! - `filled`: bytes received but not yet consumed as part of a line
//! - `scanned`: prefix of `filled` already searched for a terminator
//!
//! `0 <= scanned <= filled <= MAX_LINE_LEN` holds between calls.
//!
//! A line that is still unterminated when the buffer fills up is dropped as a
//! whole: the buffer is emptied and every byte up to and including the next
//! CRLF is skipped before framing resumes.

/// Maximum IRC line length including the trailing CRLF.
pub const MAX_LINE_LEN: usize = 512;

/// Buffer that reassembles CRLF-terminated lines from arbitrary byte chunks.
///
/// # Example
///
/// ```
/// use vanira_proto::LineBuffer;
///
/// let mut buffer = LineBuffer::new();
/// buffer.extend(b"PING :a\r");
/// assert_eq!(buffer.next_line(), None);
///
/// buffer.extend(b"\nPING :b\r\n");
/// assert_eq!(buffer.next_line().as_deref(), Some("PING :a"));
/// assert_eq!(buffer.next_line().as_deref(), Some("PING :b"));
/// assert!(buffer.is_empty());
/// ```
pub struct LineBuffer {
    buf: [u8; MAX_LINE_LEN],
    filled: usize,
    scanned: usize,
    /// Set after an overlong line filled the buffer; cleared at its CRLF.
    discarding: bool,
}

impl LineBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            buf: [0; MAX_LINE_LEN],
            filled: 0,
            scanned: 0,
            discarding: false,
        }
    }

    /// Free space at the end of the buffer, to be filled by a socket read.
    ///
    /// Never empty after [`next_line`](Self::next_line) has returned `None`.
    #[inline]
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.filled..]
    }

    /// Record that `n` bytes were written into [`spare_mut`](Self::spare_mut).
    #[inline]
    pub fn commit(&mut self, n: usize) {
        debug_assert!(self.filled + n <= MAX_LINE_LEN);
        self.filled = (self.filled + n).min(MAX_LINE_LEN);
    }

    /// Copy as much of `data` as fits and return the number of bytes taken.
    pub fn extend(&mut self, data: &[u8]) -> usize {
        let spare = self.spare_mut();
        let n = data.len().min(spare.len());
        spare[..n].copy_from_slice(&data[..n]);
        self.commit(n);
        n
    }

    /// Pull the next complete line off the front of the buffer.
    ///
    /// The CRLF terminator is stripped and invalid UTF-8 is replaced lossily.
    /// Returns `None` once no complete line remains; the partial tail stays
    /// buffered unless it already fills the whole buffer, in which case the
    /// line is discarded through its terminator.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let window = &self.buf[self.scanned..self.filled];
            if let Some(pos) = window.windows(2).position(|w| w == b"\r\n") {
                let end = self.scanned + pos;
                let line = if self.discarding {
                    None
                } else {
                    Some(String::from_utf8_lossy(&self.buf[..end]).into_owned())
                };

                let consumed = end + 2;
                self.buf.copy_within(consumed..self.filled, 0);
                self.filled -= consumed;
                self.scanned = 0;
                match line {
                    Some(line) => return Some(line),
                    None => {
                        tracing::debug!(discarded = end, "Overlong line ended");
                        self.discarding = false;
                        continue;
                    }
                }
            }

            if self.discarding || self.filled == MAX_LINE_LEN {
                if !self.discarding {
                    tracing::debug!(
                        discarded = self.filled,
                        "Line exceeded buffer capacity, discarding until CRLF"
                    );
                    self.discarding = true;
                }
                // Everything but a trailing CR goes; the CR may pair with
                // an LF from the next read.
                if self.buf[..self.filled].last() == Some(&b'\r') {
                    self.buf[0] = b'\r';
                    self.filled = 1;
                } else {
                    self.filled = 0;
                }
                self.scanned = 0;
                return None;
            }

            // A trailing CR may be the first half of a terminator still in flight.
            self.scanned = match self.buf[..self.filled].last() {
                Some(b'\r') => self.filled - 1,
                _ => self.filled,
            };
            return None;
        }
    }

    /// Number of buffered bytes not yet consumed as a line.
    #[inline]
    pub fn len(&self) -> usize {
        self.filled
    }

    /// True when no partial line is buffered and no overlong line is
    /// being skipped.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filled == 0 && !self.discarding
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineBuffer")
            .field("filled", &self.filled)
            .field("scanned", &self.scanned)
            .field("discarding", &self.discarding)
            .finish()
    }
}

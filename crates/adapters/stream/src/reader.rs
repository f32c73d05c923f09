//! Inbound frame splitting over an [`AsyncRead`].

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use pkone_domain::command::TERMINATOR;

use crate::error::StreamError;

/// Longest inbound frame accepted, terminator included.
pub const MAX_FRAME_LEN: usize = 256;

#[allow(clippy::cast_possible_truncation)]
const TERMINATOR_BYTE: u8 = TERMINATOR as u8;

/// Splits an inbound byte stream into `…E` frames.
///
/// Whitespace between frames is ignored. A frame longer than
/// [`MAX_FRAME_LEN`] is logged and dropped up to its terminator.
pub struct FrameReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: Vec::with_capacity(MAX_FRAME_LEN),
        }
    }

    /// Read the next complete frame.
    ///
    /// Returns `Ok(None)` once the stream ends; a trailing partial frame is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Io`] when reading fails.
    pub async fn next_frame(&mut self) -> Result<Option<String>, StreamError> {
        loop {
            if !self.read_chunk().await? {
                if !self.buf.trim_ascii().is_empty() {
                    tracing::warn!(bytes = self.buf.len(), "link closed mid-frame");
                }
                return Ok(None);
            }

            if self.buf.len() > MAX_FRAME_LEN {
                tracing::warn!(max = MAX_FRAME_LEN, "dropping oversized frame");
                if !self.ends_with_terminator() && !self.skip_past_terminator().await? {
                    return Ok(None);
                }
                continue;
            }

            let frame = self.buf.trim_ascii_start();
            let frame = String::from_utf8_lossy(frame).into_owned();
            tracing::debug!(%frame, "frame received");
            return Ok(Some(frame));
        }
    }

    /// Fill `buf` up to and including the next terminator, or up to one byte
    /// past the limit. Returns `false` at end of stream.
    async fn read_chunk(&mut self) -> Result<bool, StreamError> {
        self.buf.clear();
        let limit = MAX_FRAME_LEN as u64 + 1;
        let read = (&mut self.reader)
            .take(limit)
            .read_until(TERMINATOR_BYTE, &mut self.buf)
            .await?;
        Ok(read > 0 && (self.ends_with_terminator() || self.buf.len() > MAX_FRAME_LEN))
    }

    fn ends_with_terminator(&self) -> bool {
        self.buf.last() == Some(&TERMINATOR_BYTE)
    }

    async fn skip_past_terminator(&mut self) -> Result<bool, StreamError> {
        loop {
            self.buf.clear();
            let read = (&mut self.reader)
                .take(MAX_FRAME_LEN as u64)
                .read_until(TERMINATOR_BYTE, &mut self.buf)
                .await?;
            if read == 0 {
                return Ok(false);
            }
            if self.ends_with_terminator() {
                return Ok(true);
            }
        }
    }
}

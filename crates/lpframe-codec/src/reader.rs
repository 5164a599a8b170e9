use std::io::Read;

use bytes::Bytes;

use crate::codec::{Frame, FrameConfig};
use crate::error::{BoxError, Result};
use crate::framer::{decode, Framer};

/// Reads frames one at a time from any `Read` stream.
///
/// Useful when a stream is too large to collect at once, or when the caller
/// wants to know where each frame starts. As an iterator it yields raw
/// payloads and stops after a clean end of stream or the first error.
pub struct FrameReader<T> {
    inner: T,
    framer: Framer,
    frames_read: usize,
    bytes_read: u64,
    failed: bool,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self::with_framer(inner, Framer::with_config(config))
    }

    pub fn with_framer(inner: T, framer: Framer) -> Self {
        Self {
            inner,
            framer,
            frames_read: 0,
            bytes_read: 0,
            failed: false,
        }
    }

    /// Read the next raw frame.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly between frames.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        let frame = match self.framer.read_raw(&mut self.inner) {
            Ok(frame) => frame,
            Err(err) => {
                self.failed = true;
                return Err(err);
            }
        };

        if let Some(frame) = &frame {
            self.frames_read += 1;
            self.bytes_read += frame.wire_size() as u64;
        }
        Ok(frame)
    }

    /// Read the next payload without decoding it.
    pub fn read_payload(&mut self) -> Result<Option<Bytes>> {
        Ok(self.read_frame()?.map(|frame| frame.payload))
    }

    /// Read and decode the next message.
    pub fn read_message<M, E, F>(&mut self, mut unmarshal: F) -> Result<Option<M>>
    where
        F: FnMut(Bytes) -> std::result::Result<M, E>,
        E: Into<BoxError>,
    {
        let index = self.frames_read;
        match self.read_payload()? {
            Some(payload) => decode(index, payload, &mut unmarshal).map(Some),
            None => Ok(None),
        }
    }

    /// Number of complete frames read so far.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// Stream offset of the next frame.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn framer(&self) -> &Framer {
        &self.framer
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.read_payload().transpose()
    }
}

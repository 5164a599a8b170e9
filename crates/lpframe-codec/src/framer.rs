use std::io::{ErrorKind, Read, Write};

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::codec::{encode_frame, frame_size, Frame, FrameConfig};
use crate::collection::MessageCollection;
use crate::error::{BoxError, FrameError, Result, WriteError};
use crate::message::Message;
use crate::prefix::{PrefixEncoding, VarintDecoder, FIXED_PREFIX_LEN};

/// Cap on the payload buffer reserved before any payload bytes arrive.
const INITIAL_PAYLOAD_CAPACITY: usize = 64 * 1024;

/// Length-prefixed framer for one prefix encoding.
///
/// A `Framer` holds no stream state; every call works on the stream it is
/// given. Streams are not safe for concurrent use: callers serialize access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Framer {
    config: FrameConfig,
}

impl Framer {
    /// Create a framer for the given prefix encoding.
    pub fn new(prefix: PrefixEncoding) -> Self {
        Self::with_config(FrameConfig::new(prefix))
    }

    /// Create a framer from explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }

    /// Framer using a 4-byte little-endian length prefix.
    pub fn fixed() -> Self {
        Self::new(PrefixEncoding::Fixed32)
    }

    /// Framer using a varint length prefix.
    pub fn varint() -> Self {
        Self::new(PrefixEncoding::Varint)
    }

    pub fn prefix(&self) -> PrefixEncoding {
        self.config.prefix
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Wire size of one message once framed.
    pub fn frame_size<M: Message + ?Sized>(&self, msg: &M) -> usize {
        frame_size(self.config.prefix, msg)
    }

    /// Wire size of a whole sequence of messages. Zero when empty.
    pub fn collection_size<M: Message>(&self, msgs: &[M]) -> usize {
        msgs.iter().map(|m| self.frame_size(m)).sum()
    }

    /// Frame and write a single message.
    ///
    /// Returns the number of bytes written (prefix + payload). On an I/O
    /// error the stream position is indeterminate and the stream should be
    /// treated as corrupted.
    pub fn write_frame<W, M>(&self, w: &mut W, msg: &M) -> Result<usize>
    where
        W: Write + ?Sized,
        M: Message + ?Sized,
    {
        let mut buf = BytesMut::new();
        let mut written = 0usize;
        self.write_frame_buffered(w, msg, &mut buf, &mut written)?;
        Ok(written)
    }

    /// Write every message in order, stopping at the first failure.
    ///
    /// Nothing is rolled back: after an error the stream may end in a
    /// partial frame, and [`WriteError::written`] says how far it got.
    pub fn write_collection<W, M>(
        &self,
        w: &mut W,
        msgs: &[M],
    ) -> std::result::Result<usize, WriteError>
    where
        W: Write + ?Sized,
        M: Message,
    {
        let mut buf = BytesMut::new();
        let mut written = 0usize;

        for (index, msg) in msgs.iter().enumerate() {
            if let Err(err) = self.write_frame_buffered(w, msg, &mut buf, &mut written) {
                debug!(index, written, error = %err, "collection write aborted");
                return Err(WriteError::new(written, err));
            }
        }

        flush(w).map_err(|err| WriteError::new(written, err))?;
        debug!(
            frames = msgs.len(),
            bytes = written,
            prefix = %self.config.prefix,
            "wrote collection"
        );
        Ok(written)
    }

    /// Read every frame until the stream ends cleanly.
    ///
    /// All or nothing: if any frame is truncated, malformed or rejected by
    /// `unmarshal`, the messages read so far are dropped and the error is
    /// returned.
    pub fn read_collection<R, M, E, F>(
        &self,
        r: &mut R,
        mut unmarshal: F,
    ) -> Result<MessageCollection<M>>
    where
        R: Read + ?Sized,
        F: FnMut(Bytes) -> std::result::Result<M, E>,
        E: Into<BoxError>,
    {
        let mut messages = MessageCollection::new();
        let mut bytes = 0usize;

        loop {
            let next = match self.read_raw(r) {
                Ok(Some(frame)) => {
                    bytes += frame.wire_size();
                    decode(messages.len(), frame.payload, &mut unmarshal).map(Some)
                }
                Ok(None) => Ok(None),
                Err(err) => Err(err),
            };

            match next {
                Ok(Some(msg)) => messages.push(msg),
                Ok(None) => {
                    debug!(
                        frames = messages.len(),
                        bytes,
                        prefix = %self.config.prefix,
                        "read collection"
                    );
                    return Ok(messages);
                }
                Err(err) => {
                    debug!(
                        frames = messages.len(),
                        error = %err,
                        "discarding partially read collection"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Read one frame payload without decoding it.
    ///
    /// `Ok(None)` means the stream ended cleanly before a new frame began.
    pub fn read_payload<R: Read + ?Sized>(&self, r: &mut R) -> Result<Option<Bytes>> {
        Ok(self.read_raw(r)?.map(|frame| frame.payload))
    }

    /// Read one raw frame, keeping track of the prefix size on the wire.
    pub fn read_raw<R: Read + ?Sized>(&self, r: &mut R) -> Result<Option<Frame>> {
        let (declared, prefix_len) = match self.read_prefix(r)? {
            Some(prefix) => prefix,
            None => return Ok(None),
        };

        let payload = read_payload_bytes(r, declared)?;
        trace!(prefix_len, len = declared, "read frame");

        Ok(Some(Frame {
            prefix_len,
            payload,
        }))
    }

    pub(crate) fn write_frame_buffered<W, M>(
        &self,
        w: &mut W,
        msg: &M,
        buf: &mut BytesMut,
        written: &mut usize,
    ) -> Result<()>
    where
        W: Write + ?Sized,
        M: Message + ?Sized,
    {
        buf.clear();
        let len = encode_frame(self.config.prefix, msg, buf)?;
        write_counted(w, buf, written)?;
        trace!(len, prefix = %self.config.prefix, "wrote frame");
        Ok(())
    }

    /// Returns the declared payload length and the prefix size in bytes.
    fn read_prefix<R: Read + ?Sized>(&self, r: &mut R) -> Result<Option<(usize, usize)>> {
        match self.config.prefix {
            PrefixEncoding::Fixed32 => {
                let mut prefix = [0u8; FIXED_PREFIX_LEN];
                match read_fill(r, &mut prefix)? {
                    0 => Ok(None),
                    FIXED_PREFIX_LEN => {
                        Ok(Some((u32::from_le_bytes(prefix) as usize, FIXED_PREFIX_LEN)))
                    }
                    received => Err(FrameError::TruncatedPrefix { received }),
                }
            }
            PrefixEncoding::Varint => {
                // One byte at a time so nothing past the prefix is consumed.
                let mut decoder = VarintDecoder::new();
                loop {
                    let byte = match read_byte(r)? {
                        Some(byte) => byte,
                        None if decoder.consumed() == 0 => return Ok(None),
                        None => {
                            return Err(FrameError::TruncatedPrefix {
                                received: decoder.consumed(),
                            })
                        }
                    };
                    if let Some(len) = decoder.push(byte)? {
                        return Ok(Some((len as usize, decoder.consumed())));
                    }
                }
            }
        }
    }
}

pub(crate) fn decode<M, E, F>(index: usize, payload: Bytes, unmarshal: &mut F) -> Result<M>
where
    F: FnMut(Bytes) -> std::result::Result<M, E>,
    E: Into<BoxError>,
{
    unmarshal(payload).map_err(|err| FrameError::Decoding {
        index,
        source: err.into(),
    })
}

pub(crate) fn flush<W: Write + ?Sized>(w: &mut W) -> Result<()> {
    loop {
        match w.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

/// Write all of `buf`, adding each accepted chunk to `written` as it lands.
fn write_counted<W: Write + ?Sized>(w: &mut W, buf: &[u8], written: &mut usize) -> Result<()> {
    let mut offset = 0usize;
    while offset < buf.len() {
        match w.write(&buf[offset..]) {
            Ok(0) => return Err(FrameError::Io(std::io::Error::from(ErrorKind::WriteZero))),
            Ok(n) => {
                offset += n;
                *written += n;
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

fn read_byte<R: Read + ?Sized>(r: &mut R) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match r.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

/// Fill `buf` until it is full or the stream ends. Returns bytes filled.
fn read_fill<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(filled)
}

/// Read exactly `declared` payload bytes.
///
/// The buffer grows as data arrives, so a corrupted prefix announcing a huge
/// length fails on the short read instead of on a giant allocation.
fn read_payload_bytes<R: Read + ?Sized>(r: &mut R, declared: usize) -> Result<Bytes> {
    let mut payload = Vec::with_capacity(declared.min(INITIAL_PAYLOAD_CAPACITY));
    let received = r.take(declared as u64).read_to_end(&mut payload)?;

    if received < declared {
        return Err(FrameError::TruncatedPayload { declared, received });
    }

    Ok(Bytes::from(payload))
}

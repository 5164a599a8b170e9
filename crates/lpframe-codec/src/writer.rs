use std::io::Write;

use bytes::BytesMut;

use crate::codec::FrameConfig;
use crate::error::{Result, WriteError};
use crate::framer::{flush, Framer};
use crate::message::Message;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes framed messages to any `Write` stream.
///
/// Keeps one encode buffer across writes and counts the bytes the stream
/// has accepted.
pub struct FrameWriter<T> {
    inner: T,
    framer: Framer,
    buf: BytesMut,
    bytes_written: usize,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self::with_framer(inner, Framer::with_config(config))
    }

    pub fn with_framer(inner: T, framer: Framer) -> Self {
        Self {
            inner,
            framer,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            bytes_written: 0,
        }
    }

    /// Frame and write one message. Returns the frame's wire size.
    ///
    /// Does not flush; call [`FrameWriter::flush`] when done.
    pub fn write_message<M: Message + ?Sized>(&mut self, msg: &M) -> Result<usize> {
        let before = self.bytes_written;
        self.framer
            .write_frame_buffered(&mut self.inner, msg, &mut self.buf, &mut self.bytes_written)?;
        Ok(self.bytes_written - before)
    }

    /// Write messages in order and flush, stopping at the first failure.
    pub fn write_all_messages<M: Message>(
        &mut self,
        msgs: &[M],
    ) -> std::result::Result<usize, WriteError> {
        let before = self.bytes_written;
        for msg in msgs {
            if let Err(err) = self.write_message(msg) {
                return Err(WriteError::new(self.bytes_written - before, err));
            }
        }
        self.flush()
            .map_err(|err| WriteError::new(self.bytes_written - before, err))?;
        Ok(self.bytes_written - before)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        flush(&mut self.inner)
    }

    /// Total bytes accepted by the stream through this writer.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::FrameError;
    use crate::message::utf8_payload;
    use crate::prefix::PrefixEncoding;
    use crate::reader::FrameReader;

    #[test]
    fn write_multiple_messages() {
        let mut writer = FrameWriter::with_config(
            Cursor::new(Vec::<u8>::new()),
            FrameConfig::new(PrefixEncoding::Varint),
        );

        assert_eq!(writer.write_message("one").unwrap(), 4);
        assert_eq!(writer.write_message("two").unwrap(), 4);
        assert_eq!(writer.write_message("three").unwrap(), 6);
        assert_eq!(writer.bytes_written(), 14);

        let wire = writer.into_inner().into_inner();
        let decoded = Framer::varint()
            .read_collection(&mut Cursor::new(wire), utf8_payload)
            .unwrap();
        assert_eq!(decoded.into_vec(), vec!["one", "two", "three"]);
    }

    #[test]
    fn write_all_messages_matches_collection_size() {
        let msgs = vec![b"alpha".to_vec(), vec![0u8; 1000], Vec::new()];
        let mut writer = FrameWriter::new(Vec::new());

        let n = writer.write_all_messages(&msgs).unwrap();

        assert_eq!(n, Framer::fixed().collection_size(&msgs));
        assert_eq!(writer.get_ref().len(), n);
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.write_all_messages(&["x"]).unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let writer_impl = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };

        let mut writer = FrameWriter::new(writer_impl);
        writer.write_all_messages(&["retry"]).unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data.len(), 9);
    }

    #[test]
    fn would_block_is_not_retried() {
        let mut writer = FrameWriter::new(WouldBlockWriter);
        let err = writer.write_all_messages(&["x"]).unwrap_err();
        assert_eq!(err.written, 0);
        assert!(matches!(err.source, FrameError::Io(ref e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn written_bytes_decode() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_message("z").unwrap();

        let wire = writer.into_inner().into_inner();
        let mut framed = FrameReader::new(Cursor::new(wire));
        let frame = framed.read_frame().unwrap().unwrap();
        assert_eq!(frame.prefix_len, 4);
        assert_eq!(frame.payload.as_ref(), b"z");
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = FrameWriter::new(cursor);

        assert_eq!(writer.framer().prefix(), PrefixEncoding::Fixed32);
        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct WouldBlockWriter;

    impl Write for WouldBlockWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

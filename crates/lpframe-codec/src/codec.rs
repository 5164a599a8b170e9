use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{EncodeError, Result};
use crate::message::Message;
use crate::prefix::{PrefixEncoding, MAX_PAYLOAD_LEN};

/// Configuration for the frame codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameConfig {
    /// Length prefix encoding. Default: fixed 4-byte little-endian.
    pub prefix: PrefixEncoding,
}

impl FrameConfig {
    /// Configuration for the given prefix encoding.
    pub fn new(prefix: PrefixEncoding) -> Self {
        Self { prefix }
    }
}

/// A raw frame as read off the wire, before unmarshaling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Bytes the length prefix occupied on the wire.
    pub prefix_len: usize,
    /// The frame payload.
    pub payload: Bytes,
}

impl Frame {
    /// The total wire size of this frame (prefix + payload).
    pub fn wire_size(&self) -> usize {
        self.prefix_len + self.payload.len()
    }
}

/// Wire size of one framed message (prefix + payload).
pub fn frame_size<M: Message + ?Sized>(prefix: PrefixEncoding, msg: &M) -> usize {
    let len = msg.encoded_len();
    prefix.encoded_len(len) + len
}

/// Encode one message as a frame, appending it to `dst`.
///
/// The message is marshaled before anything is appended, so on error `dst`
/// is left as it was. Returns the number of bytes appended.
pub fn encode_frame<M: Message + ?Sized>(
    prefix: PrefixEncoding,
    msg: &M,
    dst: &mut BytesMut,
) -> Result<usize> {
    let declared = msg.encoded_len();
    if declared > MAX_PAYLOAD_LEN {
        return Err(EncodeError::PayloadTooLarge {
            size: declared,
            max: MAX_PAYLOAD_LEN,
        }
        .into());
    }

    let payload = msg.marshal().map_err(EncodeError::Marshal)?;
    if payload.len() != declared {
        return Err(EncodeError::SizeMismatch {
            declared,
            actual: payload.len(),
        }
        .into());
    }

    let start = dst.len();
    dst.reserve(prefix.encoded_len(declared) + declared);
    prefix.put_prefix(declared as u32, dst);
    dst.put_slice(&payload);

    Ok(dst.len() - start)
}

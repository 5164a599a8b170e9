//! The message capability consumed by the framer.
//!
//! Anything that can report its encoded size and marshal itself to bytes can
//! be framed. Decoding goes the other way through a per-call unmarshal
//! callback, so the codec never needs to know concrete message types.

use bytes::Bytes;

use crate::error::BoxError;

/// A value that can be written as one frame payload.
///
/// `marshal` must produce exactly `encoded_len` bytes, and must be
/// deterministic for the same value.
pub trait Message {
    /// Exact encoded byte length of the message.
    fn encoded_len(&self) -> usize;

    /// Encode the message to bytes.
    fn marshal(&self) -> Result<Bytes, BoxError>;
}

/// Callback converting one frame payload back into a message.
///
/// Read operations accept any `FnMut(Bytes) -> Result<M, E>`; this alias names
/// the plain function pointer form.
pub type UnmarshalFn<M> = fn(Bytes) -> Result<M, BoxError>;

impl Message for [u8] {
    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn marshal(&self) -> Result<Bytes, BoxError> {
        Ok(Bytes::copy_from_slice(self))
    }
}

impl Message for Vec<u8> {
    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn marshal(&self) -> Result<Bytes, BoxError> {
        Ok(Bytes::copy_from_slice(self))
    }
}

impl Message for Bytes {
    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn marshal(&self) -> Result<Bytes, BoxError> {
        Ok(self.clone())
    }
}

impl Message for str {
    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn marshal(&self) -> Result<Bytes, BoxError> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }
}

impl Message for String {
    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn marshal(&self) -> Result<Bytes, BoxError> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }
}

impl<M: Message + ?Sized> Message for &M {
    fn encoded_len(&self) -> usize {
        (**self).encoded_len()
    }

    fn marshal(&self) -> Result<Bytes, BoxError> {
        (**self).marshal()
    }
}

impl<M: Message + ?Sized> Message for Box<M> {
    fn encoded_len(&self) -> usize {
        (**self).encoded_len()
    }

    fn marshal(&self) -> Result<Bytes, BoxError> {
        (**self).marshal()
    }
}

/// Unmarshal callback that hands the raw payload back unchanged.
pub fn raw_payload(payload: Bytes) -> Result<Bytes, BoxError> {
    Ok(payload)
}

/// Unmarshal callback for UTF-8 text payloads.
pub fn utf8_payload(payload: Bytes) -> Result<String, BoxError> {
    Ok(String::from_utf8(payload.to_vec())?)
}

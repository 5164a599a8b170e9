//! Length-prefixed message framing for byte streams.
//!
//! lpframe writes a sequence of variable-length records onto a file, socket
//! or pipe and reads back exactly the same sequence, with no delimiters.
//!
//! # Crate Structure
//!
//! - [`codec`] — Message capability, prefix encodings, framer, streaming reader/writer
//!
//! The `lpframe` binary (behind the `cli` feature) packs, unpacks and
//! inspects framed files.

/// Re-export codec types.
pub mod codec {
    pub use lpframe_codec::*;
}

pub use lpframe_codec::{
    Framer, FrameConfig, FrameError, FrameReader, FrameWriter, Message, MessageCollection,
    PrefixEncoding, UnmarshalFn, WriteError,
};

//! Length-prefixed message framing over byte streams.
//!
//! Every message is written as:
//! - A length prefix, either a 4-byte little-endian `u32` or a 1-5 byte varint
//! - The marshaled message bytes
//!
//! Records are recovered in order without any delimiters. There is no stream
//! header, footer, magic or checksum.
//!
//! ```
//! use std::io::Cursor;
//! use lpframe_codec::{utf8_payload, Framer};
//!
//! let framer = Framer::varint();
//! let mut wire = Vec::new();
//! framer.write_collection(&mut wire, &["Foo", "Bar", "Baz"]).unwrap();
//!
//! let names = framer.read_collection(&mut Cursor::new(wire), utf8_payload).unwrap();
//! assert_eq!(names.into_vec(), vec!["Foo", "Bar", "Baz"]);
//! ```

pub mod codec;
pub mod collection;
pub mod error;
pub mod framer;
pub mod message;
pub mod prefix;
pub mod reader;
pub mod writer;

pub use codec::{encode_frame, frame_size, Frame, FrameConfig};
pub use collection::MessageCollection;
pub use error::{BoxError, EncodeError, FrameError, Result, WriteError};
pub use framer::Framer;
pub use message::{raw_payload, utf8_payload, Message, UnmarshalFn};
pub use prefix::{
    encode_varint, varint_len, ParsePrefixError, PrefixEncoding, VarintDecoder, FIXED_PREFIX_LEN,
    MAX_PAYLOAD_LEN, MAX_VARINT_LEN,
};
pub use reader::FrameReader;
pub use writer::FrameWriter;

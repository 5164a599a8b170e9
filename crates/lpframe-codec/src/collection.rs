use std::io::Write;
use std::ops::{Deref, DerefMut};

use crate::error::WriteError;
use crate::framer::Framer;
use crate::message::Message;

/// An ordered sequence of messages. Order is wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCollection<M> {
    messages: Vec<M>,
}

impl<M> MessageCollection<M> {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, msg: M) {
        self.messages.push(msg);
    }

    pub fn into_vec(self) -> Vec<M> {
        self.messages
    }
}

impl<M: Message> MessageCollection<M> {
    /// Bytes this collection occupies on the wire under `framer`.
    pub fn framed_size(&self, framer: &Framer) -> usize {
        framer.collection_size(&self.messages)
    }

    /// Write every message to `w` in order.
    pub fn write_to<W: Write>(&self, framer: &Framer, w: &mut W) -> Result<usize, WriteError> {
        framer.write_collection(w, &self.messages)
    }
}

impl<M> Default for MessageCollection<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Deref for MessageCollection<M> {
    type Target = [M];

    fn deref(&self) -> &[M] {
        &self.messages
    }
}

impl<M> DerefMut for MessageCollection<M> {
    fn deref_mut(&mut self) -> &mut [M] {
        &mut self.messages
    }
}

impl<M> From<Vec<M>> for MessageCollection<M> {
    fn from(messages: Vec<M>) -> Self {
        Self { messages }
    }
}

impl<M> FromIterator<M> for MessageCollection<M> {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl<M> Extend<M> for MessageCollection<M> {
    fn extend<I: IntoIterator<Item = M>>(&mut self, iter: I) {
        self.messages.extend(iter);
    }
}

impl<M> IntoIterator for MessageCollection<M> {
    type Item = M;
    type IntoIter = std::vec::IntoIter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a, M> IntoIterator for &'a MessageCollection<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let mut mc = MessageCollection::new();
        mc.push("b".to_string());
        mc.push("a".to_string());
        mc.push("b".to_string());

        assert_eq!(mc.len(), 3);
        assert_eq!(mc.into_vec(), vec!["b", "a", "b"]);
    }

    #[test]
    fn framed_size_matches_written_bytes() {
        let mc: MessageCollection<String> = ["Foo", "Bar", "Baz"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let framer = Framer::fixed();
        let mut out = Cursor::new(Vec::new());

        let written = mc.write_to(&framer, &mut out).unwrap();

        assert_eq!(written, mc.framed_size(&framer));
        assert_eq!(written, out.into_inner().len());
        assert_eq!(mc.framed_size(&framer), 3 * (4 + 3));
    }

    #[test]
    fn extend_and_mutate_in_place() {
        let mut mc = MessageCollection::with_capacity(4);
        assert!(mc.is_empty());

        mc.extend([b"one".to_vec(), b"two".to_vec()]);
        mc[1].extend_from_slice(b"!!");
        mc.reverse();

        let framer = Framer::varint();
        assert_eq!(mc.framed_size(&framer), (1 + 5) + (1 + 3));

        let mut out = Vec::new();
        mc.write_to(&framer, &mut out).unwrap();
        assert_eq!(out, b"\x05two!!\x03one".to_vec());
    }

    #[test]
    fn empty_collection_has_zero_size() {
        let mc: MessageCollection<Vec<u8>> = MessageCollection::default();
        assert!(mc.is_empty());
        assert_eq!(mc.framed_size(&Framer::varint()), 0);
    }
}

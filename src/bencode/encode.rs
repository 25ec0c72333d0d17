//! Bencode encoders
//!
//! [`Encoder`] serializes a [`Value`] tree, used for request replies.
//! [`DictProducer`] streams a dict straight into a preallocated buffer and
//! manages the trailing terminator so a closed dict can be extended in
//! place — the notification path uses this to encode the metadata prefix
//! exactly once.

use std::fmt::Write as _;

use bytes::{BufMut, Bytes, BytesMut};

use super::value::Value;
use super::{DICT, END, LIST};

/// Bencode tree encoder
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(256),
        }
    }

    /// Create an encoder with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Take the encoded bytes and reset the encoder
    pub fn finish(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Current encoded length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the encoder is empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Encode a single value
    pub fn encode(&mut self, value: &Value) {
        match value {
            Value::Int(n) => {
                let _ = write!(self.buf, "i{n}e");
            }
            Value::Bytes(bytes) => self.put_string(bytes),
            Value::List(items) => {
                self.buf.put_u8(LIST);
                for item in items {
                    self.encode(item);
                }
                self.buf.put_u8(END);
            }
            Value::Dict(entries) => {
                self.buf.put_u8(DICT);
                for (key, val) in entries {
                    self.put_string(key);
                    self.encode(val);
                }
                self.buf.put_u8(END);
            }
        }
    }

    fn put_string(&mut self, bytes: &[u8]) {
        let _ = write!(self.buf, "{}:", bytes.len());
        self.buf.put_slice(bytes);
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to encode a single value
pub fn encode(value: &Value) -> Bytes {
    let mut encoder = Encoder::new();
    encoder.encode(value);
    encoder.finish()
}

/// Streaming producer for a bencode dict
///
/// Keys must be appended in ascending order; the decoder on the other side
/// rejects anything else. [`view`](DictProducer::view) closes the dict and
/// returns the complete encoding; a later append reopens the buffer in
/// place, so callers can send the closed form and then keep extending it
/// without re-encoding the prefix.
pub struct DictProducer {
    buf: BytesMut,
    closed: bool,
}

impl DictProducer {
    /// Create a new producer
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create a producer with `capacity` reserved up front
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buf = BytesMut::with_capacity(capacity);
        buf.put_u8(DICT);
        Self { buf, closed: false }
    }

    /// Append a byte-string value under `key`
    pub fn append_bytes(&mut self, key: &str, value: &[u8]) {
        self.reopen();
        self.put_string(key.as_bytes());
        self.put_string(value);
    }

    /// Append an integer value under `key`
    pub fn append_int(&mut self, key: &str, value: i64) {
        self.reopen();
        self.put_string(key.as_bytes());
        let _ = write!(self.buf, "i{value}e");
    }

    /// The complete encoding, including the dict terminator
    pub fn view(&mut self) -> &[u8] {
        if !self.closed {
            self.buf.put_u8(END);
            self.closed = true;
        }
        &self.buf
    }

    /// Finalize and take the encoded dict
    pub fn finish(mut self) -> Bytes {
        self.view();
        self.buf.freeze()
    }

    fn reopen(&mut self) {
        if self.closed {
            self.buf.truncate(self.buf.len() - 1);
            self.closed = false;
        }
    }

    fn put_string(&mut self, bytes: &[u8]) {
        let _ = write!(self.buf, "{}:", bytes.len());
        self.buf.put_slice(bytes);
    }
}

impl Default for DictProducer {
    fn default() -> Self {
        Self::new()
    }
}

//! Little-endian wire primitives shared by the value, property bag, and graph
//! codecs. Strings are encoded as `(i32 length, UTF-8 bytes)`.

use crate::error::CodecError;
use bytes::{Buf, BufMut};

/// Appends wire-format primitives to a growable byte buffer.
pub(crate) struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn i32(&mut self, v: i32) {
        self.buf.put_i32_le(v);
    }

    pub fn f32(&mut self, v: f32) {
        self.buf.put_f32_le(v);
    }

    pub fn f64(&mut self, v: f64) {
        self.buf.put_f64_le(v);
    }

    pub fn bool(&mut self, v: bool) {
        self.buf.put_u8(v as u8);
    }

    pub fn string(&mut self, s: &str) {
        self.buf.put_i32_le(s.len() as i32);
        self.buf.put_slice(s.as_bytes());
    }

    pub fn raw(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Writes a length-prefixed block: `(i32 length, bytes)`.
    pub fn block(&mut self, bytes: &[u8]) {
        self.buf.put_i32_le(bytes.len() as i32);
        self.buf.put_slice(bytes);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads wire-format primitives from a byte slice, reporting truncation as
/// `CodecError::Corrupt` instead of panicking.
pub(crate) struct ByteReader<'a> {
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        !self.buf.has_remaining()
    }

    fn ensure(&self, needed: usize, what: &str) -> Result<(), CodecError> {
        if self.buf.remaining() < needed {
            return Err(CodecError::Corrupt(format!(
                "unexpected end of stream reading {} ({} bytes needed, {} left)",
                what,
                needed,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    pub fn u8(&mut self) -> Result<u8, CodecError> {
        self.ensure(1, "byte")?;
        Ok(self.buf.get_u8())
    }

    pub fn i32(&mut self) -> Result<i32, CodecError> {
        self.ensure(4, "i32")?;
        Ok(self.buf.get_i32_le())
    }

    pub fn f32(&mut self) -> Result<f32, CodecError> {
        self.ensure(4, "f32")?;
        Ok(self.buf.get_f32_le())
    }

    pub fn f64(&mut self) -> Result<f64, CodecError> {
        self.ensure(8, "f64")?;
        Ok(self.buf.get_f64_le())
    }

    pub fn bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.u8()? != 0)
    }

    pub fn string(&mut self) -> Result<String, CodecError> {
        let len = self.i32()?;
        if len < 0 {
            return Err(CodecError::Corrupt(format!(
                "negative string length {}",
                len
            )));
        }
        let bytes = self.take(len as usize)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| CodecError::Corrupt("string is not valid UTF-8".into()))
    }

    /// Takes `len` raw bytes off the front of the stream.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        self.ensure(len, "bytes")?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Reads a length-prefixed block: `(i32 length, bytes)`. Used both for
    /// known payloads and for skipping extension blocks of unknown layout.
    pub fn block(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.i32()?;
        if len < 0 {
            return Err(CodecError::Corrupt(format!(
                "negative block length {}",
                len
            )));
        }
        self.take(len as usize)
    }
}

//! # Binary Codec
//!
//! Big-endian primitives for the canonical wire form.
//!
//! `ByteWriter` is infallible. `ByteReader` checks every length before it
//! slices, so arbitrary input can be fed to a decoder without panicking.

use crate::entities::{ChainId, Hash, Timestamp};
use crate::errors::DecodeError;

/// Append-only encoder.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn push_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn push_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn push_timestamp(&mut self, value: Timestamp) -> &mut Self {
        self.buf.extend_from_slice(&value.to_bytes());
        self
    }

    pub fn push_hash(&mut self, value: &Hash) -> &mut Self {
        self.buf.extend_from_slice(value);
        self
    }

    pub fn push_chain_id(&mut self, value: &ChainId) -> &mut Self {
        self.push_hash(value.as_bytes())
    }

    /// Raw bytes with no length prefix.
    pub fn push_raw(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    /// Four-byte length followed by the bytes.
    pub fn push_bytes(&mut self, data: &[u8]) -> &mut Self {
        self.push_u32(data.len() as u32);
        self.push_raw(data)
    }

    pub fn push_str(&mut self, value: &str) -> &mut Self {
        self.push_bytes(value.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Hand back the unconsumed tail.
    pub fn into_rest(self) -> &'a [u8] {
        self.data
    }

    /// Next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, DecodeError> {
        self.data.first().copied().ok_or(DecodeError::ShortBuffer {
            needed: 1,
            remaining: 0,
        })
    }

    pub fn pop_raw(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.data.len() {
            return Err(DecodeError::ShortBuffer {
                needed: len,
                remaining: self.data.len(),
            });
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    pub fn pop_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.pop_raw(N)?);
        Ok(out)
    }

    pub fn pop_u8(&mut self) -> Result<u8, DecodeError> {
        let [b] = self.pop_array::<1>()?;
        Ok(b)
    }

    pub fn pop_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.pop_array::<4>()?))
    }

    pub fn pop_timestamp(&mut self) -> Result<Timestamp, DecodeError> {
        Ok(Timestamp::from_bytes(self.pop_array::<6>()?))
    }

    pub fn pop_hash(&mut self) -> Result<Hash, DecodeError> {
        self.pop_array::<32>()
    }

    pub fn pop_chain_id(&mut self) -> Result<ChainId, DecodeError> {
        Ok(ChainId::new(self.pop_hash()?))
    }

    /// Four-byte length followed by that many bytes.
    pub fn pop_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.pop_u32()? as usize;
        self.pop_raw(len)
    }

    pub fn pop_string(&mut self, field: &'static str) -> Result<String, DecodeError> {
        let raw = self.pop_bytes()?;
        String::from_utf8(raw.to_vec()).map_err(|err| DecodeError::Malformed {
            field,
            reason: err.to_string(),
        })
    }

    /// Consume the tag byte and check it.
    pub fn expect_tag(&mut self, expected: u8) -> Result<(), DecodeError> {
        let actual = self.pop_u8()?;
        if actual != expected {
            return Err(DecodeError::UnexpectedType { expected, actual });
        }
        Ok(())
    }
}

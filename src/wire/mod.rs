//! Wire primitives: big-endian encoding and decoding of the AgentX base
//! types (integers, octet strings, OIDs) with 4-byte alignment.
//!
//! The library always sets the NetworkByteOrder header flag, so everything
//! here is big-endian; the little-endian wire mode of RFC 2741 is
//! deliberately not supported.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::{INTERNET_PREFIX, MAX_OID_LEN, Oid};

/// Pad bytes required to bring `len` up to a 4-byte boundary.
pub(crate) fn pad_len(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Forward encode buffer for AgentX payloads.
pub struct EncodeBuf {
    buf: BytesMut,
}

impl EncodeBuf {
    /// Create a new encode buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new encode buffer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Current length of encoded data.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append a single byte.
    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    /// Append a big-endian u16.
    pub fn put_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    /// Append a big-endian u32.
    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    /// Append a big-endian i32.
    pub fn put_i32(&mut self, v: i32) {
        self.buf.put_i32(v);
    }

    /// Append a big-endian u64.
    pub fn put_u64(&mut self, v: u64) {
        self.buf.put_u64(v);
    }

    /// Append raw bytes without padding.
    pub fn put_slice(&mut self, v: &[u8]) {
        self.buf.put_slice(v);
    }

    /// Append an octet string: u32 length, the bytes, then zero padding to
    /// a 4-byte boundary. An empty string encodes as four zero bytes.
    pub fn put_octet_string(&mut self, v: &[u8]) {
        self.buf.put_u32(v.len() as u32);
        self.buf.put_slice(v);
        self.buf.put_bytes(0, pad_len(v.len()));
    }

    /// Append an OID: n_subid, prefix, include, reserved, then the
    /// big-endian arcs, using the `1.3.6.1.<p>` compression when the OID
    /// permits it.
    pub fn put_oid(&mut self, oid: &Oid, include: bool) {
        let (prefix, rest) = oid.wire_parts();
        self.buf.put_u8(rest.len() as u8);
        self.buf.put_u8(prefix);
        self.buf.put_u8(include as u8);
        self.buf.put_u8(0); // reserved
        for &arc in rest {
            self.buf.put_u32(arc);
        }
    }

    /// Finish encoding and take the bytes.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Cursor over a received payload.
///
/// Tracks the absolute offset within the PDU so decode errors can point at
/// the offending byte.
pub struct Decoder {
    buf: Bytes,
    /// Offset of `buf`'s start within the original PDU, for error reporting.
    base: usize,
}

impl Decoder {
    /// Create a decoder over a payload.
    pub fn new(buf: Bytes) -> Self {
        Self { buf, base: 0 }
    }

    /// Create a decoder whose offsets are reported relative to `base`
    /// bytes before the payload start (i.e. past a consumed header).
    pub fn with_base(buf: Bytes, base: usize) -> Self {
        Self { buf, base }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// True if all bytes are consumed.
    pub fn is_empty(&self) -> bool {
        !self.buf.has_remaining()
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.base
    }

    fn need(&self, n: usize) -> Result<()> {
        if self.buf.remaining() < n {
            return Err(Error::decode(
                self.base,
                DecodeErrorKind::ShortBuffer {
                    needed: n,
                    available: self.buf.remaining(),
                },
            ));
        }
        Ok(())
    }

    /// Read one byte.
    pub fn get_u8(&mut self) -> Result<u8> {
        self.need(1)?;
        self.base += 1;
        Ok(self.buf.get_u8())
    }

    /// Read a big-endian u16.
    pub fn get_u16(&mut self) -> Result<u16> {
        self.need(2)?;
        self.base += 2;
        Ok(self.buf.get_u16())
    }

    /// Read a big-endian u32.
    pub fn get_u32(&mut self) -> Result<u32> {
        self.need(4)?;
        self.base += 4;
        Ok(self.buf.get_u32())
    }

    /// Read a big-endian i32.
    pub fn get_i32(&mut self) -> Result<i32> {
        self.need(4)?;
        self.base += 4;
        Ok(self.buf.get_i32())
    }

    /// Read a big-endian u64.
    pub fn get_u64(&mut self) -> Result<u64> {
        self.need(8)?;
        self.base += 8;
        Ok(self.buf.get_u64())
    }

    /// Read an octet string, consuming the trailing pad bytes.
    pub fn get_octet_string(&mut self) -> Result<Bytes> {
        let start = self.base;
        let len = self.get_u32()? as usize;
        if len > self.buf.remaining() {
            return Err(Error::decode(
                start,
                DecodeErrorKind::InvalidLength { length: len as u32 },
            ));
        }
        let octets = self.buf.split_to(len);
        self.base += len;
        let pad = pad_len(len);
        self.need(pad)?;
        self.buf.advance(pad);
        self.base += pad;
        Ok(octets)
    }

    /// Read an OID, expanding the wire prefix. Returns the OID and its
    /// include flag.
    pub fn get_oid(&mut self) -> Result<(Oid, bool)> {
        let start = self.base;
        self.need(4)?;
        let n_subid = self.get_u8()? as usize;
        let prefix = self.get_u8()?;
        let include = self.get_u8()? & 0x01 != 0;
        let _reserved = self.get_u8()?;

        let expanded = if prefix != 0 { n_subid + 5 } else { n_subid };
        if expanded > MAX_OID_LEN {
            return Err(Error::decode(start, DecodeErrorKind::OidTooLong { count: expanded }));
        }

        let mut arcs = Vec::with_capacity(expanded);
        if prefix != 0 {
            arcs.extend_from_slice(&INTERNET_PREFIX);
            arcs.push(prefix as u32);
        }
        self.need(n_subid * 4)?;
        for _ in 0..n_subid {
            arcs.push(self.buf.get_u32());
        }
        self.base += n_subid * 4;

        Ok((Oid::from_arcs(&arcs), include))
    }
}

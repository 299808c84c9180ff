//! Little-endian primitives shared by record encoders and decoders.

use qmlc_core::{Location, StringId};

/// Read a little-endian u32 from bytes at the given offset.
#[inline]
pub fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
pub fn read_i32_le(bytes: &[u8], offset: usize) -> i32 {
    read_u32_le(bytes, offset) as i32
}

#[inline]
pub fn read_u64_le(bytes: &[u8], offset: usize) -> u64 {
    let lo = read_u32_le(bytes, offset) as u64;
    let hi = read_u32_le(bytes, offset + 4) as u64;
    lo | (hi << 32)
}

#[inline]
pub fn read_string_id(bytes: &[u8], offset: usize) -> StringId {
    StringId::from_raw(read_u32_le(bytes, offset))
}

#[inline]
pub fn read_location(bytes: &[u8], offset: usize) -> Location {
    Location::new(read_u32_le(bytes, offset), read_u32_le(bytes, offset + 4))
}

/// Cursor over a pre-sized output buffer.
///
/// The buffer is never grown: every write is bounds-checked against the
/// capacity computed up front, and callers assert section boundaries with
/// [`expect_position`](Self::expect_position).
#[derive(Debug)]
pub struct ByteWriter<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl<'b> ByteWriter<'b> {
    pub fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Writer starting at `pos`.
    pub fn at(buf: &'b mut [u8], pos: usize) -> Self {
        assert!(pos <= buf.len(), "writer start {pos} past end {}", buf.len());
        Self { buf, pos }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Move the cursor. Seeking past the end is an overflow.
    pub fn seek(&mut self, pos: usize) {
        assert!(
            pos <= self.buf.len(),
            "seek to {pos} overflows buffer of {} bytes",
            self.buf.len()
        );
        self.pos = pos;
    }

    /// Assert the cursor sits exactly where the layout said it would.
    #[track_caller]
    pub fn expect_position(&self, expected: usize, what: &str) {
        assert_eq!(
            self.pos, expected,
            "{what}: writer at {} but layout expected {expected}",
            self.pos
        );
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        assert!(
            end <= self.buf.len(),
            "write of {} bytes at {} overflows buffer of {} bytes",
            bytes.len(),
            self.pos,
            self.buf.len()
        );
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    #[inline]
    pub fn put_u32(&mut self, value: u32) {
        self.put_bytes(&value.to_le_bytes());
    }

    #[inline]
    pub fn put_i32(&mut self, value: i32) {
        self.put_bytes(&value.to_le_bytes());
    }

    #[inline]
    pub fn put_u64(&mut self, value: u64) {
        self.put_bytes(&value.to_le_bytes());
    }

    #[inline]
    pub fn put_string_id(&mut self, id: StringId) {
        self.put_u32(id.as_u32());
    }

    #[inline]
    pub fn put_location(&mut self, location: Location) {
        self.put_u32(location.line);
        self.put_u32(location.column);
    }

    /// Access to the underlying buffer, e.g. for the string table serializer.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut *self.buf
    }

    pub fn into_inner(self) -> &'b mut [u8] {
        self.buf
    }
}

/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Reads fixed-width big-endian fields out of a stream buffer.
//!
//! Each reader is handed the entire buffer together with an absolute offset and returns a
//! [`Field`]: the decoded value and the number of bytes it occupied. A read that would run past
//! the end of the buffer fails with [`ReadError::UnexpectedEnd`]. There is no zero-padding or
//! partial-value fallback.


use super::segment::{peek_magic_number, ReadError, SegmentReadResult};
use byteorder::{BigEndian, ByteOrder};

/// A decoded value paired with the number of bytes it was decoded from.
pub type Field<T> = (T, usize);

/// A reader that decodes one value at an absolute offset.
pub type FieldReader<T> = fn(&[u8], usize) -> SegmentReadResult<Field<T>>;

fn take(buffer: &[u8], offset: usize, size: usize) -> SegmentReadResult<&[u8]> {
    offset
        .checked_add(size)
        .and_then(|end| buffer.get(offset..end))
        .ok_or(ReadError::UnexpectedEnd {
            offset,
            needed: size,
            available: buffer.len().saturating_sub(offset),
        })
}

/// Reads an unsigned 8-bit value.
pub fn read_u8(buffer: &[u8], offset: usize) -> SegmentReadResult<Field<u8>> {
    Ok((take(buffer, offset, 1)?[0], 1))
}

/// Reads an unsigned big-endian 16-bit value.
pub fn read_u16(buffer: &[u8], offset: usize) -> SegmentReadResult<Field<u16>> {
    Ok((BigEndian::read_u16(take(buffer, offset, 2)?), 2))
}

/// Reads an unsigned big-endian 24-bit value.
pub fn read_u24(buffer: &[u8], offset: usize) -> SegmentReadResult<Field<u32>> {
    Ok((BigEndian::read_u24(take(buffer, offset, 3)?), 3))
}

/// Reads an unsigned big-endian 32-bit value.
pub fn read_u32(buffer: &[u8], offset: usize) -> SegmentReadResult<Field<u32>> {
    Ok((BigEndian::read_u32(take(buffer, offset, 4)?), 4))
}

/// Borrows `size` raw bytes.
pub fn read_bytes(buffer: &[u8], offset: usize, size: usize) -> SegmentReadResult<Field<&[u8]>> {
    Ok((take(buffer, offset, size)?, size))
}

/// Walks forward through a single record, accumulating the bytes it consumes.
pub(crate) struct FieldCursor<'a> {
    buffer: &'a [u8],
    start: usize,
    offset: usize,
}

impl<'a> FieldCursor<'a> {

    pub fn new(buffer: &'a [u8], offset: usize) -> Self {
        Self { buffer, start: offset, offset }
    }

    pub fn read<T>(&mut self, reader: FieldReader<T>) -> SegmentReadResult<T> {

        let (value, size) = reader(self.buffer, self.offset)?;

        self.offset += size;

        Ok(value)
    }

    pub fn read_bytes(&mut self, size: usize) -> SegmentReadResult<&'a [u8]> {

        let (bytes, size) = read_bytes(self.buffer, self.offset, size)?;

        self.offset += size;

        Ok(bytes)
    }

    /// Bytes consumed since the cursor was created.
    pub fn consumed(&self) -> usize {
        self.offset - self.start
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    /// Whether the next segment header begins at the current position.
    pub fn at_magic_number(&self) -> bool {
        peek_magic_number(self.buffer, self.offset)
    }
}

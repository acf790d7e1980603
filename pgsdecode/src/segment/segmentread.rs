/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

use super::{
    AnySegment,
    CompositionObject,
    CompositionState,
    Crop,
    ObjectDefinitionSegment,
    PaletteDefinitionSegment,
    PaletteEntry,
    PresentationCompositionSegment,
    Segment,
    SegmentHeader,
    SegmentType,
    Sequence,
    WindowDefinition,
    WindowDefinitionSegment,
    super::primitive::{read_u16, read_u24, read_u32, read_u8, Field, FieldCursor},
};
use log::trace;
use thiserror::Error as ThisError;

/// The two bytes every segment begins with.
pub const MAGIC_NUMBER: [u8; 2] = *b"PG";

/// The size of a segment header, magic number included.
pub const HEADER_SIZE: usize = 13;

/// The object data length field also counts the width and height fields that follow it.
const OBJECT_DIMENSIONS_SIZE: usize = 4;

/// A specialized [`Result`](std::result::Result) type for segment-reading operations.
pub type SegmentReadResult<T> = Result<T, ReadError>;

/// The error type for segment-reading operations.
///
/// Errors are either structural, meaning the offset being decoded does not hold the record
/// that was expected there, or caused by the buffer ending in the middle of a field.
#[derive(ThisError, Debug)]
pub enum ReadError {
    /// A field extends past the end of the buffer.
    #[error("buffer ends at offset {offset} with {available} of {needed} bytes available")]
    UnexpectedEnd {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("segment has unrecognized magic number 0x{value:04X} at offset {offset}")]
    UnrecognizedMagicNumber {
        offset: usize,
        value: u16,
    },
    #[error("segment has unrecognized kind 0x{value:02X} at offset {offset}")]
    UnrecognizedSegmentType {
        offset: usize,
        value: u8,
    },
    #[error(
        "presentation composition segment has unrecognized composition state 0x{value:02X} at \
        offset {offset}"
    )]
    UnrecognizedCompositionState {
        offset: usize,
        value: u8,
    },
    #[error(
        "presentation composition segment has unrecognized palette update flag 0x{value:02X} at \
        offset {offset}"
    )]
    UnrecognizedPaletteUpdateFlag {
        offset: usize,
        value: u8,
    },
    #[error("composition object has unrecognized cropped flag 0x{value:02X} at offset {offset}")]
    UnrecognizedCropFlag {
        offset: usize,
        value: u8,
    },
    #[error(
        "object definition segment has unrecognized sequence flag 0x{value:02X} at offset \
        {offset}"
    )]
    UnrecognizedObjectSequenceFlag {
        offset: usize,
        value: u8,
    },
}

impl ReadError {

    /// Returns `true` unless the error was caused by running out of buffer.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::UnexpectedEnd { .. })
    }
}

/// Allows reading segments out of a fully buffered PGS stream.
pub trait ReadSegmentExt {

    /// Reads the segment starting at `offset`, returning it along with the number of bytes it
    /// occupies.
    fn read_segment(&self, offset: usize) -> SegmentReadResult<Field<AnySegment>>;

    /// Iterates over every segment in the stream.
    fn segments(&self) -> SegmentIter<'_>;
}

impl ReadSegmentExt for [u8] {

    fn read_segment(&self, offset: usize) -> SegmentReadResult<Field<AnySegment>> {
        read_segment(self, offset)
    }

    fn segments(&self) -> SegmentIter<'_> {
        SegmentIter::new(self)
    }
}

/// Walks a stream one segment at a time.
///
/// The iterator stops at the end of the buffer. After yielding an error it yields nothing
/// further.
#[derive(Clone, Debug)]
pub struct SegmentIter<'a> {
    buffer: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> SegmentIter<'a> {

    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0, failed: false }
    }

    /// The offset at which the next segment is expected.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for SegmentIter<'a> {

    type Item = SegmentReadResult<AnySegment>;

    fn next(&mut self) -> Option<Self::Item> {

        if self.failed || self.offset >= self.buffer.len() {
            return None
        }

        match read_segment(self.buffer, self.offset) {
            Ok((segment, size)) => {
                self.offset += size;
                Some(Ok(segment))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Checks for the magic number at `offset` without failing when the buffer runs out.
pub fn peek_magic_number(buffer: &[u8], offset: usize) -> bool {
    buffer.get(offset..).map_or(false, |rest| rest.starts_with(&MAGIC_NUMBER))
}

pub fn read_magic_number(buffer: &[u8], offset: usize) -> SegmentReadResult<Field<()>> {

    let (value, size) = read_u16(buffer, offset)?;

    if value.to_be_bytes() != MAGIC_NUMBER {
        return Err(ReadError::UnrecognizedMagicNumber { offset, value })
    }

    Ok(((), size))
}

pub fn read_segment_type(buffer: &[u8], offset: usize) -> SegmentReadResult<Field<SegmentType>> {

    let (value, size) = read_u8(buffer, offset)?;
    let kind = SegmentType::try_from(value)
        .map_err(|value| ReadError::UnrecognizedSegmentType { offset, value })?;

    Ok((kind, size))
}

pub fn read_composition_state(
    buffer: &[u8],
    offset: usize,
) -> SegmentReadResult<Field<CompositionState>> {

    let (value, size) = read_u8(buffer, offset)?;
    let state = CompositionState::try_from(value)
        .map_err(|value| ReadError::UnrecognizedCompositionState { offset, value })?;

    Ok((state, size))
}

pub fn read_palette_update_flag(buffer: &[u8], offset: usize) -> SegmentReadResult<Field<bool>> {

    let (value, size) = read_u8(buffer, offset)?;
    let flag = match value {
        0x80 => true,
        0x00 => false,
        _ => return Err(ReadError::UnrecognizedPaletteUpdateFlag { offset, value }),
    };

    Ok((flag, size))
}

pub fn read_cropped_flag(buffer: &[u8], offset: usize) -> SegmentReadResult<Field<bool>> {

    let (value, size) = read_u8(buffer, offset)?;
    let flag = match value {
        0x40 => true,
        0x00 => false,
        _ => return Err(ReadError::UnrecognizedCropFlag { offset, value }),
    };

    Ok((flag, size))
}

pub fn read_sequence_flag(buffer: &[u8], offset: usize) -> SegmentReadResult<Field<Sequence>> {

    let (value, size) = read_u8(buffer, offset)?;
    let sequence = Sequence::try_from(value)
        .map_err(|value| ReadError::UnrecognizedObjectSequenceFlag { offset, value })?;

    Ok((sequence, size))
}

/// Decodes the 13-byte header at `offset`.
pub fn read_segment_header(
    buffer: &[u8],
    offset: usize,
) -> SegmentReadResult<Field<SegmentHeader>> {

    let mut input = FieldCursor::new(buffer, offset);

    input.read(read_magic_number)?;

    let pts = input.read(read_u32)?;
    let dts = input.read(read_u32)?;
    let kind = input.read(read_segment_type)?;
    let size = input.read(read_u16)?;

    Ok((SegmentHeader { pts, dts, kind, size }, input.consumed()))
}

/// Decodes a full segment, header and body, starting at `offset`.
///
/// The returned size counts the bytes the body decoder actually consumed, which can differ
/// from the size declared in the header. End segments consume nothing beyond their header.
pub fn read_segment(buffer: &[u8], offset: usize) -> SegmentReadResult<Field<AnySegment>> {

    let (header, header_size) = read_segment_header(buffer, offset)?;
    let body_offset = offset + header_size;
    let (segment, body_size) = match header.kind {
        SegmentType::PresentationComposition => {
            let (body, size) = read_pcs(buffer, body_offset)?;
            (AnySegment::PresentationComposition(Segment { header, body }), size)
        }
        SegmentType::WindowDefinition => {
            let (body, size) = read_wds(buffer, body_offset)?;
            (AnySegment::WindowDefinition(Segment { header, body }), size)
        }
        SegmentType::PaletteDefinition => {
            let (body, size) = read_pds(buffer, body_offset)?;
            (AnySegment::PaletteDefinition(Segment { header, body }), size)
        }
        SegmentType::ObjectDefinition => {
            let (body, size) = read_ods(buffer, body_offset, Some(header.size))?;
            (AnySegment::ObjectDefinition(Segment { header, body }), size)
        }
        SegmentType::End => (AnySegment::End(header), 0),
    };

    trace!(
        "{:?} segment at offset {} (declared {} bytes, consumed {})",
        header.kind,
        offset,
        header.size,
        body_size,
    );

    Ok((segment, header_size + body_size))
}

/// Decodes the body of a Presentation Composition Segment.
///
/// Decoding stops early when the next segment header follows a composition object, even if
/// fewer objects were read than the PCS declared.
pub fn read_pcs(
    buffer: &[u8],
    offset: usize,
) -> SegmentReadResult<Field<PresentationCompositionSegment>> {

    let mut input = FieldCursor::new(buffer, offset);
    let width = input.read(read_u16)?;
    let height = input.read(read_u16)?;
    let frame_rate = input.read(read_u8)?;
    let composition_number = input.read(read_u16)?;
    let composition_state = input.read(read_composition_state)?;
    let palette_update = input.read(read_palette_update_flag)?;
    let palette_id = input.read(read_u8)?;
    let object_count = input.read(read_u8)?;
    let mut composition_objects = Vec::with_capacity(object_count as usize);

    for _ in 0..object_count {

        composition_objects.push(input.read(read_composition_object)?);

        if input.at_magic_number() || input.is_exhausted() {
            break
        }
    }

    Ok((
        PresentationCompositionSegment {
            width,
            height,
            frame_rate,
            composition_number,
            composition_state,
            palette_update,
            palette_id,
            object_count,
            composition_objects,
        },
        input.consumed(),
    ))
}

/// Decodes a single composition object.
///
/// A cropped flag that is immediately followed by a segment header is treated as clear, and no
/// cropping rectangle is read.
pub fn read_composition_object(
    buffer: &[u8],
    offset: usize,
) -> SegmentReadResult<Field<CompositionObject>> {

    let mut input = FieldCursor::new(buffer, offset);
    let object_id = input.read(read_u16)?;
    let window_id = input.read(read_u8)?;
    let cropped = input.read(read_cropped_flag)?;
    let x = input.read(read_u16)?;
    let y = input.read(read_u16)?;
    let crop = if cropped && !input.at_magic_number() {
        Some(
            Crop {
                x: input.read(read_u16)?,
                y: input.read(read_u16)?,
                width: input.read(read_u16)?,
                height: input.read(read_u16)?,
            }
        )
    } else {
        None
    };

    Ok((CompositionObject { object_id, window_id, x, y, crop }, input.consumed()))
}

/// Decodes the body of a Window Definition Segment.
///
/// Windows are read until the next segment header or the end of the buffer. The declared
/// window count is kept but does not bound the loop.
pub fn read_wds(
    buffer: &[u8],
    offset: usize,
) -> SegmentReadResult<Field<WindowDefinitionSegment>> {

    let mut input = FieldCursor::new(buffer, offset);
    let window_count = input.read(read_u8)?;
    let mut windows = Vec::with_capacity(window_count as usize);

    while !input.at_magic_number() && !input.is_exhausted() {
        windows.push(input.read(read_window_definition)?);
    }

    Ok((WindowDefinitionSegment { window_count, windows }, input.consumed()))
}

pub fn read_window_definition(
    buffer: &[u8],
    offset: usize,
) -> SegmentReadResult<Field<WindowDefinition>> {

    let mut input = FieldCursor::new(buffer, offset);
    let window = WindowDefinition {
        id: input.read(read_u8)?,
        x: input.read(read_u16)?,
        y: input.read(read_u16)?,
        width: input.read(read_u16)?,
        height: input.read(read_u16)?,
    };

    Ok((window, input.consumed()))
}

/// Decodes the body of a Palette Definition Segment.
///
/// Entries are read until the next segment header or the end of the buffer.
pub fn read_pds(
    buffer: &[u8],
    offset: usize,
) -> SegmentReadResult<Field<PaletteDefinitionSegment>> {

    let mut input = FieldCursor::new(buffer, offset);
    let id = input.read(read_u8)?;
    let version = input.read(read_u8)?;
    let mut entries = Vec::new();

    while !input.at_magic_number() && !input.is_exhausted() {
        entries.push(input.read(read_palette_entry)?);
    }

    Ok((PaletteDefinitionSegment { id, version, entries }, input.consumed()))
}

pub fn read_palette_entry(buffer: &[u8], offset: usize) -> SegmentReadResult<Field<PaletteEntry>> {

    let mut input = FieldCursor::new(buffer, offset);
    let entry = PaletteEntry {
        id: input.read(read_u8)?,
        y: input.read(read_u8)?,
        cr: input.read(read_u8)?,
        cb: input.read(read_u8)?,
        alpha: input.read(read_u8)?,
    };

    Ok((entry, input.consumed()))
}

/// Decodes the body of an Object Definition Segment.
///
/// When the declared size of the enclosing segment is known, the object data runs from the end
/// of the fixed fields to the end of the segment, whatever the object data length field says.
/// Otherwise the object data length field is used.
pub fn read_ods(
    buffer: &[u8],
    offset: usize,
    segment_size: Option<u16>,
) -> SegmentReadResult<Field<ObjectDefinitionSegment>> {

    let mut input = FieldCursor::new(buffer, offset);
    let id = input.read(read_u16)?;
    let version = input.read(read_u8)?;
    let sequence = input.read(read_sequence_flag)?;
    let data_length = input.read(read_u24)?;
    let width = input.read(read_u16)?;
    let height = input.read(read_u16)?;
    let data_size = match segment_size {
        Some(segment_size) => (segment_size as usize).saturating_sub(input.consumed()),
        None => (data_length as usize).saturating_sub(OBJECT_DIMENSIONS_SIZE),
    };
    let data = input.read_bytes(data_size)?.to_vec();

    Ok((
        ObjectDefinitionSegment {
            id,
            version,
            sequence,
            data_length,
            width,
            height,
            data,
        },
        input.consumed(),
    ))
}

/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

use super::{
    DisplaySet,
    super::{
        primitive::Field,
        segment::{
            read_pcs,
            read_segment,
            read_segment_header,
            AnySegment,
            ReadError as SegmentReadError,
            Segment,
            SegmentType,
        },
    },
};
use log::{debug, warn};
use thiserror::Error as ThisError;

/// A specialized [`Result`](std::result::Result) type for display set-reading operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// The error type for display set-reading operations.
#[derive(ThisError, Debug)]
pub enum ReadError {
    /// A segment could not be decoded.
    #[error("segment value error")]
    SegmentError {
        #[from]
        source: SegmentReadError,
    },
    /// The display set does not open with a PCS.
    #[error(
        "first segment is not a presentation composition segment ({kind:?} at offset {offset})"
    )]
    MissingPresentationCompositionSegment {
        offset: usize,
        kind: SegmentType,
    },
}

/// Allows reading display sets out of a fully buffered PGS stream.
pub trait ReadDisplaySetExt {

    /// Reads the display set whose PCS starts at `offset`, returning it along with the number
    /// of bytes it occupies.
    fn read_display_set(&self, offset: usize) -> ReadResult<Field<DisplaySet>>;

    /// Iterates over every display set in the stream.
    fn display_sets(&self) -> DisplaySetIter<'_>;
}

impl ReadDisplaySetExt for [u8] {

    fn read_display_set(&self, offset: usize) -> ReadResult<Field<DisplaySet>> {
        read_display_set(self, offset)
    }

    fn display_sets(&self) -> DisplaySetIter<'_> {
        DisplaySetIter::new(self)
    }
}

/// Walks a stream one display set at a time, starting from its first byte.
///
/// The iterator stops once the end of the buffer is reached exactly. It yields nothing further
/// after an error, or after a display set that would not advance the walk.
#[derive(Clone, Debug)]
pub struct DisplaySetIter<'a> {
    buffer: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> DisplaySetIter<'a> {

    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0, done: false }
    }

    /// The offset at which the next display set is expected.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for DisplaySetIter<'a> {

    type Item = ReadResult<DisplaySet>;

    fn next(&mut self) -> Option<Self::Item> {

        if self.done || self.offset == self.buffer.len() {
            return None
        }

        match read_display_set(self.buffer, self.offset) {
            // Unreachable while every display set spans at least its PCS header and body.
            Ok((_, 0)) => {
                warn!("display set at offset {} consumed no bytes; stopping", self.offset);
                self.done = true;
                None
            }
            Ok((display_set, size)) => {
                debug!(
                    "display set at offset {} spans {} bytes ({} WDS, {} PDS, {} ODS)",
                    self.offset,
                    size,
                    display_set.wds.len(),
                    display_set.pds.len(),
                    display_set.ods.len(),
                );
                self.offset += size;
                Some(Ok(display_set))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Decodes every display set in the stream, failing on the first one that cannot be decoded.
pub fn read_display_sets(buffer: &[u8]) -> ReadResult<Vec<DisplaySet>> {
    DisplaySetIter::new(buffer).collect()
}

/// Decodes the display set whose PCS begins at `offset`.
///
/// Segments are gathered until an End Segment, the next PCS, the end of the buffer, or a
/// segment that is structurally unrecognizable. Neither the next PCS nor an unrecognizable
/// segment is consumed. Running out of buffer partway through a segment is an error.
pub fn read_display_set(buffer: &[u8], offset: usize) -> ReadResult<Field<DisplaySet>> {

    let (header, header_size) = read_segment_header(buffer, offset)?;

    if header.kind != SegmentType::PresentationComposition {
        return Err(ReadError::MissingPresentationCompositionSegment { offset, kind: header.kind })
    }

    let (body, body_size) = read_pcs(buffer, offset + header_size)?;
    let pcs = Segment { header, body };
    let mut size = header_size + body_size;
    let mut wds = Vec::new();
    let mut pds = Vec::new();
    let mut ods = Vec::new();
    let mut end = None;

    while offset + size < buffer.len() {

        let segment_offset = offset + size;
        let next = read_segment_header(buffer, segment_offset)
            .and_then(|(header, _)| match header.kind {
                SegmentType::PresentationComposition => Ok(None),
                _ => read_segment(buffer, segment_offset).map(Some),
            });
        let (segment, segment_size) = match next {
            Ok(Some(result)) => result,
            Ok(None) => break,
            Err(err) if err.is_structural() => {
                debug!("display set at offset {} stops: {}", offset, err);
                break
            }
            Err(err) => return Err(err.into()),
        };

        match segment {
            AnySegment::WindowDefinition(segment) => wds.push(segment),
            AnySegment::PaletteDefinition(segment) => pds.push(segment),
            AnySegment::ObjectDefinition(segment) => ods.push(segment),
            AnySegment::End(header) => end = Some(header),
            AnySegment::PresentationComposition(_) => break,
        }

        size += segment_size;

        if end.is_some() {
            break
        }
    }

    Ok((DisplaySet { pcs, wds, pds, ods, end }, size))
}

/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Decodes Presentation Graphics Stream (PGS) subtitle bitstreams.
//!
//! # Overview
//!
//! A PGS bitstream (typically stored in a `.sup` file) is a flat sequence of segments. Each
//! segment begins with the two-byte magic number `PG`, followed by a PTS, a DTS, a type byte,
//! and the declared size of the body that follows. Segments are grouped into display sets
//! (DS), each of which opens with a Presentation Composition Segment (PCS) and normally closes
//! with an End Segment (ES).
//!
//! This crate operates on a fully buffered stream. Every reader takes the whole buffer along
//! with an absolute offset and reports how many bytes it consumed, so decoding one record tells
//! the caller exactly where the next one begins.
//!
//! - [`primitive`] decodes fixed-width big-endian fields.
//! - [`segment`] decodes individual segments.
//! - [`displayset`] assembles segments into display sets and walks an entire stream.
//!
//! The run-length encoded bitmap carried by object definitions is extracted verbatim and is
//! never decompressed here.

#[cfg(test)]
mod tests;
#[cfg(test)]
mod testutil;

pub mod displayset;
pub mod primitive;
pub mod segment;

pub use displayset::{read_display_set, read_display_sets, DisplaySet, ReadDisplaySetExt};
pub use segment::{read_segment, AnySegment, ReadSegmentExt};

/// The number of PTS/DTS ticks per second.
pub const TICKS_PER_SECOND: u32 = 90_000;

/// Renders a 90 kHz timestamp as `HH:MM:SS.mmm`.
pub fn ts_to_timestamp(ts: u32) -> String {

    let ms = ts / (TICKS_PER_SECOND / 1_000);
    let hours = ms / 3_600_000;
    let minutes = ms / 60_000 % 60;
    let seconds = ms / 1_000 % 60;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

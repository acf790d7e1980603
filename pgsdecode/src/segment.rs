/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Operates on individual segments.
//!
//! # Overview
//!
//! A segment is the most fundamental data structure within a PGS bitstream. Multiple segments
//! come together in a well-defined manner to form a display set (DS).
//!
//! There are five types that typically appear in this order:
//!
//! 1. Presentation Composition Segment (PCS)
//! 2. Window Definition Segment (WDS)
//! 3. Palette Definition Segment (PDS)
//! 4. Object Definition Segment (ODS)
//! 5. End Segment (ES)
//!
//! Every segment starts with the same 13-byte header: the magic number `PG`, the PTS, the DTS,
//! a type byte, and the declared size of the body. The declared size is advisory. Only the ODS
//! decoder relies on it, and only to decide how much compressed object data belongs to it.
//!
//! ## Presentation Composition Segment (PCS)
//!
//! A PCS signals the start of a new display set (DS). It also defines properties such as the
//! role of the DS within the larger epoch, the screen resolution, and initial mappings of
//! objects to windows.
//!
//! ## Window Definition Segment (WDS)
//!
//! A WDS defines the areas of the screen that will be used to show objects during the larger
//! epoch.
//!
//! ## Palette Definition Segment (PDS)
//!
//! A PDS contains a list of YCrCbA values with each one having a unique ID.
//!
//! ## Object Definition Segment (ODS)
//!
//! An ODS carries all or part of a run-length encoded bitmap. Large objects are split across
//! several consecutive ODS records.
//!
//! ## End Segment (ES)
//!
//! An ES signals that the current DS has come to an end.


mod segmentread;

pub use segmentread::*;

#[cfg(feature = "serde")]
use serde::{ser::SerializeStruct, Serialize, Serializer};

/// Identifies the type of a segment from its header.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum SegmentType {
    PaletteDefinition = 0x14,
    ObjectDefinition = 0x15,
    PresentationComposition = 0x16,
    WindowDefinition = 0x17,
    End = 0x80,
}

impl TryFrom<u8> for SegmentType {

    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x14 => Ok(Self::PaletteDefinition),
            0x15 => Ok(Self::ObjectDefinition),
            0x16 => Ok(Self::PresentationComposition),
            0x17 => Ok(Self::WindowDefinition),
            0x80 => Ok(Self::End),
            _ => Err(value),
        }
    }
}

/// Defines the role of a PCS (and thereby the associated DS) within an epoch.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum CompositionState {
    /// Indicates that the associated PCS (and the DS it belongs to) defines the start of a new
    /// epoch. As such, the associated DS should contain all other segments necessary to render
    /// a composition onto the screen.
    EpochStart,
    /// Similar to `EpochStart`, except used to refresh the screen with the current composition.
    /// This allows a player to seek past an `EpochStart` and land in the middle of an epoch,
    /// while still being able to show the relevant composition once the `AcquisitionPoint` is
    /// encountered.
    AcquisitionPoint,
    /// This updates the composition that is on the screen. This is typically used to clear the
    /// current composition from the screen by defining a PCS with no composition objects,
    /// thereby effectively closing out the current epoch.
    Normal,
}

impl Default for CompositionState {
    fn default() -> Self { Self::EpochStart }
}

impl TryFrom<u8> for CompositionState {

    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Normal),
            0x40 => Ok(Self::AcquisitionPoint),
            0x80 => Ok(Self::EpochStart),
            _ => Err(value),
        }
    }
}

/// Defines this object's role in a possible multi-part object.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Sequence {
    /// This object is discrete and stands alone.
    #[cfg_attr(feature = "serde", serde(rename = "FirstAndLast"))]
    Single,
    /// This object is the first portion in a multi-part object.
    First,
    /// This object is the last portion in a multi-part object.
    Last,
}

impl Default for Sequence {
    fn default() -> Self { Self::Single }
}

impl TryFrom<u8> for Sequence {

    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x40 => Ok(Self::Last),
            0x80 => Ok(Self::First),
            0xC0 => Ok(Self::Single),
            _ => Err(value),
        }
    }
}

impl Sequence {

    /// Whether this portion opens an object.
    pub fn is_first(self) -> bool {
        self != Self::Last
    }

    /// Whether this portion closes an object.
    pub fn is_last(self) -> bool {
        self != Self::First
    }
}

/// The fixed prefix shared by every segment.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SegmentHeader {
    /// The timestamp indicating when composition decoding should start. In practice, this is
    /// the time at which the composition is displayed. All segments within a DS typically have
    /// identical values here.
    pub pts: u32,
    /// The timestamp indicating when the composition should be displayed. In practice, this
    /// value is always zero.
    pub dts: u32,
    pub kind: SegmentType,
    /// The declared size of the body following the header.
    pub size: u16,
}

/// Written with the magic number spelled out, even though every decoded header carries `PG`.
#[cfg(feature = "serde")]
impl Serialize for SegmentHeader {

    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {

        let mut state = serializer.serialize_struct("SegmentHeader", 5)?;

        state.serialize_field("MagicNumber", "PG")?;
        state.serialize_field("PTS", &self.pts)?;
        state.serialize_field("DTS", &self.dts)?;
        state.serialize_field("SegmentType", &self.kind)?;
        state.serialize_field("SegmentSize", &self.size)?;
        state.end()
    }
}

/// A decoded segment body paired with the header that introduced it.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Segment<B> {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub header: SegmentHeader,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub body: B,
}

/// Represents any PGS segment.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum AnySegment {
    /// Represents a Presentation Composition Segment (PCS).
    PresentationComposition(Segment<PresentationCompositionSegment>),
    /// Represents a Window Definition Segment (WDS).
    WindowDefinition(Segment<WindowDefinitionSegment>),
    /// Represents a Palette Definition Segment (PDS).
    PaletteDefinition(Segment<PaletteDefinitionSegment>),
    /// Represents an Object Definition Segment (ODS).
    ObjectDefinition(Segment<ObjectDefinitionSegment>),
    /// Represents an End Segment (ES), which has no body.
    End(SegmentHeader),
}

impl AnySegment {

    pub fn header(&self) -> &SegmentHeader {
        match self {
            Self::PresentationComposition(pcs) => &pcs.header,
            Self::WindowDefinition(wds) => &wds.header,
            Self::PaletteDefinition(pds) => &pds.header,
            Self::ObjectDefinition(ods) => &ods.header,
            Self::End(header) => header,
        }
    }
}

/// Defines the body of a Presentation Composition Segment (PCS).
///
/// A PCS marks the beginning of a display set (DS).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct PresentationCompositionSegment {
    /// The width of the display in pixels. This value should be consistent within a
    /// presentation.
    pub width: u16,
    /// The height of the display in pixels. This value should be consistent within a
    /// presentation.
    pub height: u16,
    /// This value should be set to `0x10` and can typically be ignored.
    pub frame_rate: u8,
    /// Incremented by one every time a graphics update occurs.
    pub composition_number: u16,
    pub composition_state: CompositionState,
    /// Whether this PCS describes a palette-only display update.
    #[cfg_attr(feature = "serde", serde(rename = "PaletteUpdateFlag"))]
    pub palette_update: bool,
    /// The palette to use for a palette-only display update. Only meaningful when
    /// `palette_update` is set.
    #[cfg_attr(feature = "serde", serde(rename = "PaletteID"))]
    pub palette_id: u8,
    /// The number of composition objects the PCS claims to carry. This may exceed the length
    /// of `composition_objects`.
    #[cfg_attr(feature = "serde", serde(rename = "NumberOfCompositionObjects"))]
    pub object_count: u8,
    pub composition_objects: Vec<CompositionObject>,
}

impl PresentationCompositionSegment {

    /// The palette ID of a palette-only display update, or `None` for any other PCS.
    pub fn palette_update_id(&self) -> Option<u8> {
        if self.palette_update {
            Some(self.palette_id)
        } else {
            None
        }
    }
}

/// Places an object within a window.
///
/// Up to two composition objects may share a window ID.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct CompositionObject {
    pub object_id: u16,
    pub window_id: u8,
    pub x: u16,
    pub y: u16,
    /// The cropping rectangle. Present exactly when the object's cropped flag is set.
    pub crop: Option<Crop>,
}

/// The cropped flag is not stored separately, so it is written out from `crop`.
#[cfg(feature = "serde")]
impl Serialize for CompositionObject {

    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {

        let len = if self.crop.is_some() { 6 } else { 5 };
        let mut state = serializer.serialize_struct("CompositionObject", len)?;

        state.serialize_field("ObjectID", &self.object_id)?;
        state.serialize_field("WindowID", &self.window_id)?;
        state.serialize_field("ObjectCroppedFlag", &self.is_cropped())?;
        state.serialize_field("ObjectHorizontalPosition", &self.x)?;
        state.serialize_field("ObjectVerticalPosition", &self.y)?;

        match &self.crop {
            Some(crop) => state.serialize_field("Cropping", crop)?,
            None => state.skip_field("Cropping")?,
        }

        state.end()
    }
}

impl CompositionObject {

    pub fn is_cropped(&self) -> bool {
        self.crop.is_some()
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Crop {
    #[cfg_attr(feature = "serde", serde(rename = "ObjectCroppingHorizontalPosition"))]
    pub x: u16,
    #[cfg_attr(feature = "serde", serde(rename = "ObjectCroppingVerticalPosition"))]
    pub y: u16,
    #[cfg_attr(feature = "serde", serde(rename = "ObjectCroppingWidth"))]
    pub width: u16,
    #[cfg_attr(feature = "serde", serde(rename = "ObjectCroppingHeight"))]
    pub height: u16,
}

/// Defines the body of a Window Definition Segment (WDS).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct WindowDefinitionSegment {
    /// The number of windows the WDS claims to carry. The windows actually decoded are bounded
    /// by the next segment header instead.
    #[cfg_attr(feature = "serde", serde(rename = "NumberOfWindows"))]
    pub window_count: u8,
    pub windows: Vec<WindowDefinition>,
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct WindowDefinition {
    #[cfg_attr(feature = "serde", serde(rename = "WindowID"))]
    pub id: u8,
    #[cfg_attr(feature = "serde", serde(rename = "WindowHorizontalPosition"))]
    pub x: u16,
    #[cfg_attr(feature = "serde", serde(rename = "WindowVerticalPosition"))]
    pub y: u16,
    #[cfg_attr(feature = "serde", serde(rename = "WindowWidth"))]
    pub width: u16,
    #[cfg_attr(feature = "serde", serde(rename = "WindowHeight"))]
    pub height: u16,
}

/// Defines the body of a Palette Definition Segment (PDS).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PaletteDefinitionSegment {
    #[cfg_attr(feature = "serde", serde(rename = "PaletteID"))]
    pub id: u8,
    /// Incremented within an epoch each time the palette changes.
    #[cfg_attr(feature = "serde", serde(rename = "PaletteVersionNumber"))]
    pub version: u8,
    #[cfg_attr(feature = "serde", serde(rename = "PaletteEntries"))]
    pub entries: Vec<PaletteEntry>,
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PaletteEntry {
    #[cfg_attr(feature = "serde", serde(rename = "PaletteEntryID"))]
    pub id: u8,
    #[cfg_attr(feature = "serde", serde(rename = "Luminance"))]
    pub y: u8,
    #[cfg_attr(feature = "serde", serde(rename = "ColorDifferenceRed"))]
    pub cr: u8,
    #[cfg_attr(feature = "serde", serde(rename = "ColorDifferenceBlue"))]
    pub cb: u8,
    #[cfg_attr(feature = "serde", serde(rename = "Transparency"))]
    pub alpha: u8,
}

/// Defines the body of an Object Definition Segment (ODS).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct ObjectDefinitionSegment {
    #[cfg_attr(feature = "serde", serde(rename = "ObjectID"))]
    pub id: u16,
    #[cfg_attr(feature = "serde", serde(rename = "ObjectVersionNumber"))]
    pub version: u8,
    #[cfg_attr(feature = "serde", serde(rename = "LastInSequenceFlag"))]
    pub sequence: Sequence,
    /// The object data length as declared by the segment. For fragmented objects this
    /// describes the whole object rather than this fragment.
    #[cfg_attr(feature = "serde", serde(rename = "ObjectDataLength"))]
    pub data_length: u32,
    pub width: u16,
    pub height: u16,
    /// The run-length encoded bitmap bytes carried by this segment.
    #[cfg_attr(feature = "serde", serde(rename = "ObjectData"))]
    pub data: Vec<u8>,
}

/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Operates on display sets.
//!
//! A display set (DS) is the group of segments needed to render one subtitle update: a
//! Presentation Composition Segment (PCS) followed by any number of window, palette, and object
//! definitions, normally closed by an End Segment (ES). Each segment is kept together with its
//! own header and in stream order.


mod displaysetread;

pub use displaysetread::*;

use super::{
    segment::{
        CompositionState,
        ObjectDefinitionSegment,
        PaletteDefinitionSegment,
        PresentationCompositionSegment,
        Segment,
        SegmentHeader,
        WindowDefinition,
        WindowDefinitionSegment,
    },
    TICKS_PER_SECOND,
};
use std::collections::BTreeMap;
use log::debug;

#[cfg(feature = "serde")]
use serde::Serialize;

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DisplaySet {
    pub pcs: Segment<PresentationCompositionSegment>,
    pub wds: Vec<Segment<WindowDefinitionSegment>>,
    pub pds: Vec<Segment<PaletteDefinitionSegment>>,
    pub ods: Vec<Segment<ObjectDefinitionSegment>>,
    /// The header of the End Segment that closed this DS, if one did.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub end: Option<SegmentHeader>,
}

/// An object reassembled from one or more ODS fragments.
///
/// The data is still run-length encoded.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Object {
    pub id: u16,
    pub version: u8,
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

impl DisplaySet {

    /// The PTS of the PCS that opened this DS.
    pub fn pts(&self) -> u32 {
        self.pcs.header.pts
    }

    pub fn pts_ms(&self) -> u32 {
        self.pts() / (TICKS_PER_SECOND / 1_000)
    }

    pub fn composition_state(&self) -> CompositionState {
        self.pcs.body.composition_state
    }

    /// Finds a window by ID. Later definitions take precedence.
    pub fn find_window(&self, id: u8) -> Option<&WindowDefinition> {
        self.wds
            .iter()
            .rev()
            .flat_map(|wds| wds.body.windows.iter().rev())
            .find(|window| window.id == id)
    }

    /// Finds the latest definition of a palette by ID.
    pub fn find_palette(&self, id: u8) -> Option<&PaletteDefinitionSegment> {
        self.pds.iter().rev().map(|pds| &pds.body).find(|pds| pds.id == id)
    }

    /// Joins ODS fragments into whole objects, in the order they are completed.
    ///
    /// Width and height are taken from the first fragment. Fragments that cannot be paired (a
    /// last fragment with no first, or a first fragment never closed within this DS) are left
    /// out.
    pub fn objects(&self) -> Vec<Object> {

        let mut pending = BTreeMap::<u16, Object>::new();
        let mut objects = Vec::new();

        for ods in self.ods.iter().map(|ods| &ods.body) {

            if ods.sequence.is_first() {
                if pending.contains_key(&ods.id) {
                    debug!("object {} restarted before its last fragment", ods.id);
                }
                pending.insert(
                    ods.id,
                    Object {
                        id: ods.id,
                        version: ods.version,
                        width: ods.width,
                        height: ods.height,
                        data: Vec::new(),
                    },
                );
            }

            match pending.get_mut(&ods.id) {
                Some(object) => object.data.extend_from_slice(&ods.data),
                None => {
                    debug!("dropping last fragment of object {} with no first fragment", ods.id);
                    continue
                }
            }

            if ods.sequence.is_last() {
                if let Some(object) = pending.remove(&ods.id) {
                    objects.push(object);
                }
            }
        }

        for id in pending.keys() {
            debug!("object {} has no last fragment in this display set", id);
        }

        objects
    }
}

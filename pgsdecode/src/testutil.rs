/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: CC0-1.0
 */

//! Builds synthetic PGS byte streams for tests.

use byteorder::{BigEndian, WriteBytesExt};

pub const PDS: u8 = 0x14;
pub const ODS: u8 = 0x15;
pub const PCS: u8 = 0x16;
pub const WDS: u8 = 0x17;
pub const END: u8 = 0x80;

/// A segment whose declared size matches its payload.
pub fn segment(kind: u8, pts: u32, payload: &[u8]) -> Vec<u8> {
    segment_sized(kind, pts, payload.len() as u16, payload)
}

/// A segment with an arbitrary declared size.
pub fn segment_sized(kind: u8, pts: u32, size: u16, payload: &[u8]) -> Vec<u8> {

    let mut buffer = vec![];

    buffer.extend_from_slice(b"PG");
    buffer.write_u32::<BigEndian>(pts).unwrap();
    buffer.write_u32::<BigEndian>(0).unwrap();
    buffer.write_u8(kind).unwrap();
    buffer.write_u16::<BigEndian>(size).unwrap();
    buffer.extend_from_slice(payload);

    buffer
}

pub fn end_segment(pts: u32) -> Vec<u8> {
    segment(END, pts, &[])
}

pub fn pcs_payload(
    width: u16,
    height: u16,
    composition_number: u16,
    state: u8,
    object_count: u8,
    objects: &[u8],
) -> Vec<u8> {

    let mut payload = vec![];

    payload.write_u16::<BigEndian>(width).unwrap();
    payload.write_u16::<BigEndian>(height).unwrap();
    payload.write_u8(0x10).unwrap();
    payload.write_u16::<BigEndian>(composition_number).unwrap();
    payload.write_u8(state).unwrap();
    payload.write_u8(0x00).unwrap();
    payload.write_u8(0x00).unwrap();
    payload.write_u8(object_count).unwrap();
    payload.extend_from_slice(objects);

    payload
}

pub fn composition_object(
    object_id: u16,
    window_id: u8,
    cropped_flag: u8,
    x: u16,
    y: u16,
    crop: Option<[u16; 4]>,
) -> Vec<u8> {

    let mut record = vec![];

    record.write_u16::<BigEndian>(object_id).unwrap();
    record.write_u8(window_id).unwrap();
    record.write_u8(cropped_flag).unwrap();
    record.write_u16::<BigEndian>(x).unwrap();
    record.write_u16::<BigEndian>(y).unwrap();

    for value in crop.iter().flatten() {
        record.write_u16::<BigEndian>(*value).unwrap();
    }

    record
}

pub fn wds_payload(window_count: u8, windows: &[(u8, u16, u16, u16, u16)]) -> Vec<u8> {

    let mut payload = vec![window_count];

    for &(id, x, y, width, height) in windows {
        payload.write_u8(id).unwrap();
        payload.write_u16::<BigEndian>(x).unwrap();
        payload.write_u16::<BigEndian>(y).unwrap();
        payload.write_u16::<BigEndian>(width).unwrap();
        payload.write_u16::<BigEndian>(height).unwrap();
    }

    payload
}

pub fn pds_payload(id: u8, version: u8, entries: &[(u8, u8, u8, u8, u8)]) -> Vec<u8> {

    let mut payload = vec![id, version];

    for &(id, y, cr, cb, alpha) in entries {
        payload.extend_from_slice(&[id, y, cr, cb, alpha]);
    }

    payload
}

pub fn ods_payload(
    id: u16,
    version: u8,
    sequence_flag: u8,
    data_length: u32,
    width: u16,
    height: u16,
    data: &[u8],
) -> Vec<u8> {

    let mut payload = vec![];

    payload.write_u16::<BigEndian>(id).unwrap();
    payload.write_u8(version).unwrap();
    payload.write_u8(sequence_flag).unwrap();
    payload.write_u24::<BigEndian>(data_length).unwrap();
    payload.write_u16::<BigEndian>(width).unwrap();
    payload.write_u16::<BigEndian>(height).unwrap();
    payload.extend_from_slice(data);

    payload
}

/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: CC0-1.0
 */

use super::*;

#[test]
fn test_ts_to_timestamp_zero() {
    assert_eq!(ts_to_timestamp(0), "00:00:00.000");
}

#[test]
fn test_ts_to_timestamp_components() {

    // 1 hour, 2 minutes, 3 seconds, 456 milliseconds
    let ms = 3_600_000 + 2 * 60_000 + 3 * 1_000 + 456;

    assert_eq!(ts_to_timestamp(ms * 90), "01:02:03.456");
}

#[test]
fn test_ts_to_timestamp_truncates_sub_millisecond_ticks() {
    assert_eq!(ts_to_timestamp(90 * 1_500 + 89), "00:00:01.500");
}

#[test]
fn test_ts_to_timestamp_max() {
    assert_eq!(ts_to_timestamp(u32::MAX), "13:15:21.858");
}

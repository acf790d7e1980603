/*
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * Copyright 2021 William Swartzendruber
 *
 * SPDX-License-Identifier: MPL-2.0
 */


use pgsdecode::{
    ts_to_timestamp,
    displayset::ReadDisplaySetExt,
    segment::ReadSegmentExt,
};
use std::{
    fs::File,
    io::{stdin, stdout, BufWriter, Read, Write},
    path::{Path, PathBuf},
    process::exit,
};
use anyhow::{Context, Result};
use clap::{app_from_crate, crate_authors, crate_description, crate_name, crate_version, Arg};
use log::{error, info, warn};
use serde::Serialize;

fn main() {

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{:#}", err);
        exit(1);
    }
}

fn run() -> Result<()> {

    let matches = app_from_crate!()
        .arg(Arg::with_name("input")
            .index(1)
            .value_name("INPUT-FILE")
            .help("Input PGS file; use - for STDIN")
            .required(true)
        )
        .arg(Arg::with_name("output")
            .short("o")
            .long("output")
            .value_name("OUTPUT-FILE")
            .help("Output JSON file; use - for STDOUT [default: input with .json extension]")
            .takes_value(true)
        )
        .arg(Arg::with_name("segments")
            .long("segments")
            .help("Dump individual segments instead of display sets")
        )
        .arg(Arg::with_name("compact")
            .long("compact")
            .help("Write JSON without indentation")
        )
        .arg(Arg::with_name("keep-partial")
            .long("keep-partial")
            .help("Write whatever was decoded before a bitstream error instead of nothing")
        )
        .after_help(format!("This utility will decode PGS subtitles into JSON.\n\n\
            Copyright © 2021 William Swartzendruber\n\
            Licensed under the Mozilla Public License 2.0\n\
            <{}>", env!("CARGO_PKG_REPOSITORY")).as_str())
        .get_matches();
    let input_value = matches.value_of("input").unwrap_or("-");
    let output_value = match matches.value_of("output") {
        Some(output_value) => PathBuf::from(output_value),
        None => default_output_path(input_value),
    };
    let compact = matches.is_present("compact");
    let keep_partial = matches.is_present("keep-partial");
    let buffer = read_input(input_value)?;

    info!("Read {} bytes from {}.", buffer.len(), input_value);

    if matches.is_present("segments") {

        let (segments, failure) = collect_partial(buffer.segments());

        info!("Decoded {} segments.", segments.len());
        finish(&output_value, &segments, failure, compact, keep_partial)
    } else {

        let (display_sets, failure) = collect_partial(buffer.display_sets());

        info!("Decoded {} display sets.", display_sets.len());

        if let (Some(first), Some(last)) = (display_sets.first(), display_sets.last()) {
            info!(
                "Display sets span {} to {}.",
                ts_to_timestamp(first.pts()),
                ts_to_timestamp(last.pts()),
            );
        }

        finish(&output_value, &display_sets, failure, compact, keep_partial)
    }
}

/// Derives the output path from the input path, sending STDIN input to STDOUT.
fn default_output_path(input_value: &str) -> PathBuf {
    if input_value == "-" {
        PathBuf::from("-")
    } else {
        Path::new(input_value).with_extension("json")
    }
}

fn read_input(input_value: &str) -> Result<Vec<u8>> {

    let mut buffer = Vec::new();

    if input_value == "-" {
        stdin().read_to_end(&mut buffer).context("Could not read from STDIN.")?;
    } else {
        File::open(input_value)
            .and_then(|mut file| file.read_to_end(&mut buffer))
            .with_context(|| format!("Could not read input file {}.", input_value))?;
    }

    Ok(buffer)
}

/// Drains a decoding iterator, keeping the prefix that decoded before any failure.
fn collect_partial<T, E>(results: impl Iterator<Item = Result<T, E>>) -> (Vec<T>, Option<E>) {

    let mut values = Vec::new();

    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(err) => return (values, Some(err)),
        }
    }

    (values, None)
}

fn finish<T, E>(
    output_value: &Path,
    values: &[T],
    failure: Option<E>,
    compact: bool,
    keep_partial: bool,
) -> Result<()> where
    T: Serialize,
    E: std::error::Error + Send + Sync + 'static,
{

    match failure {
        Some(err) if keep_partial => {
            warn!(
                "Keeping {} values decoded before a bitstream error: {:#}",
                values.len(),
                anyhow::Error::from(err),
            );
        }
        Some(err) => {
            return Err(err).context("Could not decode PGS bitstream.")
        }
        None => {
        }
    }

    write_json(output_value, values, compact)?;

    if output_value != Path::new("-") {
        info!("Wrote {}.", output_value.display());
    }

    Ok(())
}

fn write_json<T: Serialize>(output_value: &Path, values: &[T], compact: bool) -> Result<()> {

    let mut output: Box<dyn Write> = if output_value == Path::new("-") {
        Box::new(BufWriter::new(stdout()))
    } else {
        let file = File::create(output_value).with_context(|| {
            format!("Could not open output file {}.", output_value.display())
        })?;

        Box::new(BufWriter::new(file))
    };

    if compact {
        serde_json::to_writer(&mut output, values)?;
    } else {
        serde_json::to_writer_pretty(&mut output, values)?;
    }

    writeln!(output)?;
    output.flush()?;

    Ok(())
}

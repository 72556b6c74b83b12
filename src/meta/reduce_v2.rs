//! Reducer for the 2.x dialect.
//!
//! Plane records come in pairs keyed by the image they describe,
//! `Coords-<dir>/img_channel000_position000_time000000000_z000.tif` and
//! `Metadata-<dir>/...`. Both feed the same per-plane table. Axis identity is
//! read from the labelled fields of the file name, so no Z/T heuristic
//! applies.
//!
//! `UserData` objects use one stanza per entry:
//!
//! ```text
//! "Camera-Binning": {
//!   "type": "STRING",
//!   "scalar": "1"
//! },
//! ```
//!
//! The first inner line is a type annotation and is skipped; the second one
//! carries the value, which is stored even when it is empty.

use log::debug;

use super::builder::{parse_or_warn, ParseContext, PositionBuilder};
use super::camera::apply_plane_key;
use super::coord::PlaneCoord;
use super::header::{apply_extent, apply_header_key};
use super::lexer::{Event, Lexer};
use super::version::Dialect;
use crate::error::MmStackError;

const RECORD_PREFIXES: [&str; 2] = ["Coords-", "Metadata-"];
const USER_DATA: &str = "UserData";
const INTENDED_DIMENSIONS: &str = "IntendedDimensions";

/// Folds a V2 event stream into `builder`.
pub(crate) fn reduce(
    lexer: &mut Lexer<'_>,
    builder: &mut PositionBuilder,
    ctx: &mut ParseContext,
) -> Result<(), MmStackError> {
    while let Some(event) = lexer.next() {
        match event {
            Event::ObjectOpen(Some(key)) if is_record_key(&key) => {
                let (coord, position) =
                    decode_frame_name(&key).ok_or_else(|| MmStackError::MalformedRecord {
                        path: builder.metadata_file().to_path_buf(),
                        line: lexer.line(),
                        message: format!(
                            "expected '..._channel<N>_position<N>_time<N>_z<N>.<ext>', found '{key}'"
                        ),
                    })?;
                if position != builder.position.position_index {
                    debug!(
                        "record {key} names position {position}, declared index is {}",
                        builder.position.position_index
                    );
                }
                ctx.coord = coord;
                ctx.first_record_seen = true;
                reduce_record(lexer, builder, ctx);
            }
            Event::ObjectOpen(Some(key)) if key == INTENDED_DIMENSIONS => lexer.skip_object(),
            Event::ObjectOpen(Some(key)) if key == USER_DATA => {
                reduce_user_data(lexer, builder, ctx, None);
            }
            Event::Key { key, value } => {
                apply_header_key(builder, ctx, &key, &value, lexer.line())?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn is_record_key(key: &str) -> bool {
    RECORD_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
}

/// Reads one record body up to its closing brace.
fn reduce_record(lexer: &mut Lexer<'_>, builder: &mut PositionBuilder, ctx: &mut ParseContext) {
    let mut depth = 0usize;
    while let Some(event) = lexer.next() {
        match event {
            Event::ObjectOpen(Some(key)) if key == USER_DATA => {
                let coord = ctx.coord;
                reduce_user_data(lexer, builder, ctx, Some(coord));
            }
            Event::ObjectOpen(Some(key)) if key == INTENDED_DIMENSIONS => lexer.skip_object(),
            Event::ObjectOpen(_) => depth += 1,
            Event::ObjectClose => {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            }
            Event::Key { key, value } => {
                builder.record(&key, &value);
                builder.record_plane(ctx.coord, &key, &value);
                apply_record_key(builder, ctx, &key, &value);
            }
            Event::Empty(_) | Event::ArrayOpen(_) | Event::ArrayClose => {}
        }
    }
}

/// Reads a `UserData` object whose `ObjectOpen` was just returned.
///
/// `plane` is the coordinate of the enclosing record, or `None` for the
/// summary's `UserData`.
fn reduce_user_data(
    lexer: &mut Lexer<'_>,
    builder: &mut PositionBuilder,
    ctx: &mut ParseContext,
    plane: Option<PlaneCoord>,
) {
    let mut depth = 0usize;
    let mut entry: Option<String> = None;
    let mut inner_keys = 0usize;

    while let Some(event) = lexer.next() {
        match event {
            Event::ObjectOpen(name) => {
                if depth == 0 {
                    entry = name;
                    inner_keys = 0;
                }
                depth += 1;
            }
            Event::ObjectClose => {
                if depth == 0 {
                    return;
                }
                depth -= 1;
                if depth == 0 {
                    entry = None;
                }
            }
            Event::Key { key, value } => {
                if depth == 0 {
                    store_user_entry(builder, ctx, plane, &key, &value);
                    continue;
                }
                if depth != 1 {
                    continue;
                }
                inner_keys += 1;
                if inner_keys == 2 {
                    if let Some(name) = entry.as_deref() {
                        store_user_entry(builder, ctx, plane, name, &value);
                    }
                }
            }
            // The value line of a stanza still counts when it is empty.
            Event::Empty(_) if depth == 1 => {
                inner_keys += 1;
                if inner_keys == 2 {
                    if let Some(name) = entry.as_deref() {
                        store_user_entry(builder, ctx, plane, name, "");
                    }
                }
            }
            Event::Empty(_) | Event::ArrayOpen(_) | Event::ArrayClose => {}
        }
    }
}

fn store_user_entry(
    builder: &mut PositionBuilder,
    ctx: &mut ParseContext,
    plane: Option<PlaneCoord>,
    key: &str,
    value: &str,
) {
    builder.record(key, value);
    match plane {
        Some(coord) => {
            builder.record_plane(coord, key, value);
            apply_record_key(builder, ctx, key, value);
        }
        None => {
            if key == "Width" || key == "Height" {
                apply_extent(builder, Dialect::V2, key, value);
            }
        }
    }
}

/// Keys a V2 plane record may carry on top of the shared physical set.
fn apply_record_key(builder: &mut PositionBuilder, ctx: &mut ParseContext, key: &str, value: &str) {
    match key {
        "Width" | "Height" => apply_extent(builder, Dialect::V2, key, value),
        "PositionIndex" => {
            if let Some(index) = parse_or_warn(key, value) {
                builder.position_mut().position_index = index;
            }
        }
        "UUID" => {
            let position = builder.position_mut();
            if position.uuid.is_none() {
                position.uuid = Some(value.to_string());
            }
        }
        _ => apply_plane_key(builder, ctx, key, value),
    }
}

/// Decodes the labelled fields of a synthesized image name.
///
/// Returns the plane coordinate and the position number embedded in the
/// name. Only the text after the last `/` is considered, and the labels must
/// appear in the order `_channel`, `_position`, `_time`, `_z`.
pub fn decode_frame_name(key: &str) -> Option<(PlaneCoord, usize)> {
    let name = key.rsplit('/').next()?;
    let mut rest = name;
    let c = labelled_number(&mut rest, "_channel")?;
    let position = labelled_number(&mut rest, "_position")?;
    let t = labelled_number(&mut rest, "_time")?;
    let z = labelled_number(&mut rest, "_z")?;
    Some((PlaneCoord { z, c, t }, position))
}

/// Finds `label` in `rest`, parses the digit run after it and advances
/// `rest` past the digits.
fn labelled_number(rest: &mut &str, label: &str) -> Option<usize> {
    let start = rest.find(label)? + label.len();
    let tail = &rest[start..];
    let len = tail
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(tail.len());
    let number = tail[..len].parse().ok()?;
    *rest = &tail[len..];
    Some(number)
}

/// Fuzz-only entrypoint for the frame name decoder.
#[cfg(feature = "fuzzing")]
pub fn fuzz_decode_frame_name(key: &str) -> Option<(usize, usize, usize, usize)> {
    decode_frame_name(key).map(|(coord, position)| (coord.z, coord.c, coord.t, position))
}

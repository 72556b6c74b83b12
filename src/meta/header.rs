//! Header keys: everything outside the per-plane records.
//!
//! Header entries fill the acquisition-wide fields and the initial axis
//! lengths. Every entry, recognized or not, is also recorded in the table.

use super::builder::{parse_or_warn, ParseContext, PositionBuilder};
use super::model::PixelType;
use super::version::Dialect;
use crate::error::MmStackError;

/// Applies one header entry to the position under construction.
///
/// `line` is the input line the entry was read from, used in errors.
pub(crate) fn apply_header_key(
    builder: &mut PositionBuilder,
    ctx: &ParseContext,
    key: &str,
    value: &str,
    line: usize,
) -> Result<(), MmStackError> {
    builder.record(key, value);

    match key {
        "FileName" => builder.register_file(ctx.coord, value),
        "IJType" => {
            let pixel_type = value
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(PixelType::from_ij_type)
                .ok_or_else(|| MmStackError::UnknownPixelType {
                    path: builder.metadata_file().to_path_buf(),
                    line,
                    code: value.to_string(),
                })?;
            builder.position_mut().pixel_type = Some(pixel_type);
        }
        "Width" | "Height" => apply_extent(builder, ctx.dialect, key, value),
        _ => apply_scalar(builder, key, value),
    }
    Ok(())
}

/// Sets X or Y. V2 payloads write placeholder zeros, so only strictly
/// positive extents are taken there.
pub(crate) fn apply_extent(builder: &mut PositionBuilder, dialect: Dialect, key: &str, value: &str) {
    let Some(extent) = parse_or_warn::<i64>(key, value) else {
        return;
    };
    if dialect == Dialect::V2 && extent <= 0 {
        return;
    }
    let extent = usize::try_from(extent).unwrap_or(0);
    let axes = &mut builder.position_mut().axes;
    if key == "Width" {
        axes.x = extent;
    } else {
        axes.y = extent;
    }
}

fn apply_scalar(builder: &mut PositionBuilder, key: &str, value: &str) {
    let position = builder.position_mut();
    match key {
        "UUID" => position.uuid = Some(value.to_string()),
        "Channels" => {
            if let Some(channels) = parse_or_warn(key, value) {
                position.axes.channel = channels;
            }
        }
        "ChNames" => position.channels = split_channel_names(value),
        "Frames" => {
            if let Some(frames) = parse_or_warn(key, value) {
                position.axes.time = frames;
            }
        }
        "Slices" => {
            if let Some(slices) = parse_or_warn(key, value) {
                position.axes.z = slices;
            }
        }
        "Prefix" => position.name = value.to_string(),
        "PixelSize_um" => {
            if let Some(size) = parse_or_warn(key, value) {
                position.pixel_size = Some(size);
            }
        }
        "z-step_um" => {
            if let Some(step) = parse_or_warn(key, value) {
                position.slice_thickness = Some(step);
            }
        }
        "Time" => position.time = Some(value.to_string()),
        "Comment" => position.comment = Some(value.to_string()),
        "PositionIndex" => {
            if let Some(index) = parse_or_warn(key, value) {
                position.position_index = index;
            }
        }
        _ => {}
    }
}

fn split_channel_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|name| name.replace('"', "").trim().to_string())
        .collect()
}

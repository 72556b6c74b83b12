//! Reducer for the 1.4-era dialect.
//!
//! Plane records are objects keyed `FrameKey-T-C-Z`. Some acquisitions label
//! depth as time; when the first record is reached and fewer frames than
//! slices were declared, the two axes are exchanged (if the caller allows it)
//! and every coordinate of this position is transposed from then on.

use log::{debug, warn};

use super::builder::{ParseContext, PositionBuilder};
use super::camera::apply_plane_key;
use super::coord::PlaneCoord;
use super::header::apply_header_key;
use super::lexer::{Event, Lexer};
use crate::error::MmStackError;

const FRAME_KEY_PREFIX: &str = "FrameKey-";

/// Folds a V1 event stream into `builder`.
pub(crate) fn reduce(
    lexer: &mut Lexer<'_>,
    builder: &mut PositionBuilder,
    ctx: &mut ParseContext,
) -> Result<(), MmStackError> {
    while let Some(event) = lexer.next() {
        match event {
            Event::ObjectOpen(Some(key)) if key.starts_with(FRAME_KEY_PREFIX) => {
                let coord = decode_frame_key(&key).ok_or_else(|| MmStackError::MalformedRecord {
                    path: builder.metadata_file().to_path_buf(),
                    line: lexer.line(),
                    message: format!("expected '{FRAME_KEY_PREFIX}T-C-Z', found '{key}'"),
                })?;
                begin_record(builder, ctx);
                ctx.coord = if ctx.swapped { coord.transposed() } else { coord };
                debug!("frame record {key} -> {}", ctx.coord);
                reduce_record(lexer, builder, ctx);
            }
            Event::Key { key, value } => {
                apply_header_key(builder, ctx, &key, &value, lexer.line())?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Decides the Z/T swap on the first record of the position.
fn begin_record(builder: &mut PositionBuilder, ctx: &mut ParseContext) {
    if ctx.first_record_seen {
        return;
    }
    ctx.first_record_seen = true;

    let axes = &mut builder.position_mut().axes;
    if ctx.swap_preference && axes.time < axes.z {
        warn!(
            "{} frames but {} slices declared; swapping Z and time",
            axes.time, axes.z
        );
        axes.swap_z_and_time();
        ctx.swapped = true;
    }
}

/// Reads one record body up to its closing brace. Nested objects are
/// flattened into the record.
fn reduce_record(lexer: &mut Lexer<'_>, builder: &mut PositionBuilder, ctx: &mut ParseContext) {
    let mut depth = 0usize;
    while let Some(event) = lexer.next() {
        match event {
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
                apply_plane_key(builder, ctx, &key, &value);
            }
            Event::Empty(_) | Event::ArrayOpen(_) | Event::ArrayClose => {}
        }
    }
}

/// Decodes `FrameKey-T-C-Z` into a coordinate.
pub(crate) fn decode_frame_key(key: &str) -> Option<PlaneCoord> {
    let mut parts = key.strip_prefix(FRAME_KEY_PREFIX)?.split('-');
    let t = parts.next()?.trim().parse().ok()?;
    let c = parts.next()?.trim().parse().ok()?;
    let z = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(PlaneCoord { z, c, t })
}

//! Acquisition model and metadata parsing engine.
//!
//! A Micro-Manager `metadata.txt` is parsed in one pass:
//!
//! 1. **Version detection**: the `MicroManagerVersion` marker selects the
//!    V1 (`FrameKey-T-C-Z` records) or V2 (`Coords-`/`Metadata-` records)
//!    grammar.
//! 2. **Lexing**: the pseudo-JSON text is turned into a stream of
//!    [`lexer::Event`]s.
//! 3. **Reduction**: a dialect-specific reducer folds the events into a
//!    [`Position`], routing header keys and per-plane records to their
//!    extractors.
//!
//! Payloads with a version marker neither dialect covers are not an error:
//! the position comes back with its version set and nothing extracted.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use mmstack::meta::{parse_metadata, PlaneCoord};
//!
//! let text = r#"{
//!   "Summary": {
//!     "MicroManagerVersion": "1.4.22",
//!     "Frames": 2,
//!     "Slices": 2,
//!     "Prefix": "cells"
//!   },
//!   "FrameKey-0-0-1": {
//!     "FileName": "cells_000000000_DAPI_001.tif"
//!   }
//! }"#;
//!
//! let position = parse_metadata(text, 0, Path::new("run/metadata.txt"), true).unwrap();
//! assert_eq!(position.name, "cells (Pos0)");
//! assert!(position.plane_files.contains_key(&PlaneCoord::new(1, 0, 0)));
//! ```

pub(crate) mod builder;
pub mod camera;
mod coord;
mod header;
pub mod lexer;
mod model;
mod reduce_v1;
mod reduce_v2;
pub mod sidecar;
mod version;

use std::path::Path;

use log::{info, warn};

pub use coord::{AxisLengths, PlaneCoord, PlaneKey, MAX_PLANE_COUNT};
pub use model::{Acquisition, MetadataTable, PixelType, Position};
pub use reduce_v2::decode_frame_name;
#[cfg(feature = "fuzzing")]
pub use reduce_v2::fuzz_decode_frame_name;
pub use version::{Dialect, SchemaVersion, VERSION_MARKER};

use crate::error::MmStackError;
use builder::{ParseContext, PositionBuilder};
use lexer::Lexer;

/// Parses one position's metadata text.
///
/// `ordinal` is the position's index within the acquisition and keys its
/// per-plane tables. `metadata_file` anchors relative image file names.
/// When `swap_z_and_time` is false the V1 Z/T heuristic is disabled.
pub fn parse_metadata(
    text: &str,
    ordinal: usize,
    metadata_file: &Path,
    swap_z_and_time: bool,
) -> Result<Position, MmStackError> {
    let version = SchemaVersion::detect(text);
    let mut position = Position::new(ordinal, metadata_file);
    position.version = version;

    let Some(dialect) = version.dialect() else {
        warn!(
            "{}: metadata version {version} is not supported, nothing extracted",
            metadata_file.display()
        );
        return Ok(position);
    };
    info!("{}: parsing as {version}", metadata_file.display());

    let mut builder = PositionBuilder::new(position);
    let mut ctx = ParseContext::new(dialect, swap_z_and_time);
    let mut lexer = Lexer::new(text);
    match dialect {
        Dialect::V1 => reduce_v1::reduce(&mut lexer, &mut builder, &mut ctx)?,
        Dialect::V2 => reduce_v2::reduce(&mut lexer, &mut builder, &mut ctx)?,
    }
    let position = builder.finish(&ctx);
    check_plane_count(&position)?;
    Ok(position)
}

/// Rejects positions whose declared extents describe more planes than an
/// acquisition can hold.
pub(crate) fn check_plane_count(position: &Position) -> Result<(), MmStackError> {
    if position.axes.is_representable() {
        return Ok(());
    }
    let axes = position.axes;
    Err(MmStackError::TooManyPlanes {
        path: position.metadata_file.clone(),
        z: axes.z,
        channel: axes.channel,
        time: axes.time,
    })
}

/// Fuzz-only entrypoint that parses arbitrary text as a metadata file.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_metadata(text: &str) -> Result<usize, MmStackError> {
    let position = parse_metadata(text, 0, Path::new("fuzz/metadata.txt"), true)?;
    Ok(position.plane_files.len())
}

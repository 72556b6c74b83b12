//! Per-position parse state.
//!
//! [`ParseContext`] carries the mutable state a reducer needs while walking
//! one metadata text (Z/T swap decision, bound camera, current plane).
//! [`PositionBuilder`] accumulates fields into a [`Position`] and finalises
//! it once the text is exhausted. Both are owned by a single parse, so
//! positions can be parsed on separate threads.

use log::warn;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::coord::{PlaneCoord, PlaneKey};
use super::model::{MetadataTable, Position};
use super::version::Dialect;

/// Mutable state threaded through a reducer.
#[derive(Clone, Debug)]
pub struct ParseContext {
    pub dialect: Dialect,
    /// Caller preference: allow the V1 Z/T swap heuristic.
    pub swap_preference: bool,
    /// Set once the first plane record has been seen.
    pub first_record_seen: bool,
    /// Whether Z and time were exchanged for this position.
    pub swapped: bool,
    /// Camera named by the last `Core-Camera` entry.
    pub camera_ref: Option<String>,
    /// Coordinate of the plane record being read.
    pub coord: PlaneCoord,
}

impl ParseContext {
    pub fn new(dialect: Dialect, swap_preference: bool) -> Self {
        Self {
            dialect,
            swap_preference,
            first_record_seen: false,
            swapped: false,
            camera_ref: None,
            coord: PlaneCoord::default(),
        }
    }
}

/// Accumulates one position's fields during a parse.
#[derive(Debug)]
pub struct PositionBuilder {
    pub(crate) position: Position,
    stamps: Vec<f64>,
}

impl PositionBuilder {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            stamps: Vec::new(),
        }
    }

    pub fn metadata_file(&self) -> &Path {
        &self.position.metadata_file
    }

    /// Records a key/value in the position's contribution to the
    /// acquisition-wide table.
    pub fn record(&mut self, key: &str, value: &str) {
        self.position
            .table
            .insert(key.to_string(), value.to_string());
    }

    /// Records a key/value in the table of the plane at `coord`.
    pub fn record_plane(&mut self, coord: PlaneCoord, key: &str, value: &str) {
        let plane_key = PlaneKey::new(self.position.ordinal, coord);
        self.position
            .plane_tables
            .entry(plane_key)
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Registers `file_name` (relative to the metadata file) as the image for
    /// `coord`. The first file ever registered becomes the base file.
    pub fn register_file(&mut self, coord: PlaneCoord, file_name: &str) {
        let file = sibling(&self.position.metadata_file, file_name);
        if self.position.base_file.is_none() {
            self.position.base_file = Some(file.clone());
        }
        self.position.plane_files.insert(coord, file);
    }

    pub fn push_timestamp(&mut self, seconds: f64) {
        self.stamps.push(seconds);
    }

    /// Mutable access to the position under construction.
    pub fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    /// The position's contribution to the acquisition-wide table so far.
    pub fn table(&self) -> &MetadataTable {
        &self.position.table
    }

    /// Sorts timestamps, finalises the display name and releases the position.
    pub fn finish(mut self, ctx: &ParseContext) -> Position {
        self.stamps.sort_by(f64::total_cmp);
        let position = &mut self.position;
        position.timestamps = self.stamps;
        position.swapped_z_and_time = ctx.swapped;
        position.camera_ref = ctx.camera_ref.clone();

        if position.name.is_empty() {
            position.name = default_name(&position.metadata_file);
        }
        position.name = format!("{} (Pos{})", position.name, position.position_index);
        self.position
    }
}

/// Parses a numeric field, logging and returning `None` when it is malformed.
pub(crate) fn parse_or_warn<T: FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("ignoring non-numeric value '{value}' for '{key}'");
            None
        }
    }
}

/// Joins a file name onto the directory holding `metadata_file`.
pub(crate) fn sibling(metadata_file: &Path, file_name: &str) -> PathBuf {
    match metadata_file.parent() {
        Some(dir) => dir.join(file_name),
        None => Path::new(file_name).to_path_buf(),
    }
}

fn default_name(metadata_file: &Path) -> String {
    metadata_file
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

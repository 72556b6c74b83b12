//! Core acquisition model.
//!
//! A Micro-Manager acquisition is a set of stage positions. Each position is
//! recovered from its own `metadata.txt` and carries the global acquisition
//! parameters, the per-plane provenance, and the mapping from plane
//! coordinates to image files.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::coord::{AxisLengths, PlaneCoord, PlaneKey};
use super::version::SchemaVersion;

/// A flat, string-keyed metadata table. Later inserts overwrite earlier ones.
pub type MetadataTable = BTreeMap<String, String>;

/// Pixel bit depth declared by the `IJType` header key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PixelType {
    U8,
    U16,
}

impl PixelType {
    /// Maps an `IJType` code to a pixel type.
    pub fn from_ij_type(code: i64) -> Option<Self> {
        match code {
            0 => Some(PixelType::U8),
            1 => Some(PixelType::U16),
            _ => None,
        }
    }

    /// Bits per sample.
    pub fn bits(&self) -> u32 {
        match self {
            PixelType::U8 => 8,
            PixelType::U16 => 16,
        }
    }
}

/// One stage position's complete acquisition.
///
/// Built in a single pass over the position's metadata text and read-only
/// afterwards. Plane lookups live in [`crate::index`].
#[derive(Clone, Debug, Serialize)]
pub struct Position {
    /// Ordinal of this position within the acquisition (the image index).
    pub ordinal: usize,

    /// The `metadata.txt` this position was parsed from.
    pub metadata_file: PathBuf,

    /// The `Acqusition.xml` sidecar, if one was read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidecar_file: Option<PathBuf>,

    /// Schema dialect detected in the metadata text.
    pub version: SchemaVersion,

    /// Display name (`Prefix` plus a ` (PosN)` suffix).
    pub name: String,

    /// Declared axis lengths.
    pub axes: AxisLengths,

    /// Pixel bit depth, if the header declared one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_type: Option<PixelType>,

    /// Channel names in declaration order.
    pub channels: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Acquisition start time, as written by the acquisition software.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Exposure time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<f64>,

    /// Z step in micrometers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_thickness: Option<f64>,

    /// Pixel size in micrometers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_size: Option<f64>,

    /// Camera temperature in degrees Celsius.
    pub temperature: f64,

    /// Camera gain; `-1` when the recorded value was not numeric.
    pub gain: i32,

    /// Binning as `"WxH"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binning: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detector_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detector_model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detector_manufacturer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_mode: Option<String>,

    /// The last camera bound through `Core-Camera`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_ref: Option<String>,

    /// DAC voltages in encounter order.
    pub voltages: Vec<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    /// The `PositionIndex` declared by the acquisition software.
    pub position_index: usize,

    /// Elapsed times in seconds, sorted ascending.
    pub timestamps: Vec<f64>,

    /// Whether Z and time were exchanged while parsing this position.
    pub swapped_z_and_time: bool,

    /// First image file named by the metadata; the template for synthesis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_file: Option<PathBuf>,

    /// Candidate image files, in raster order when synthesized or scanned.
    pub files: Vec<PathBuf>,

    /// Explicit plane coordinate to file registrations.
    #[serde(skip)]
    pub plane_files: BTreeMap<PlaneCoord, PathBuf>,

    /// Every key/value seen in each plane record.
    #[serde(skip)]
    pub plane_tables: BTreeMap<PlaneKey, MetadataTable>,

    /// Every key/value this position contributed to the acquisition table.
    #[serde(skip)]
    pub table: MetadataTable,
}

impl Position {
    /// Creates an empty position for the given metadata file.
    pub fn new(ordinal: usize, metadata_file: impl Into<PathBuf>) -> Self {
        Self {
            ordinal,
            metadata_file: metadata_file.into(),
            sidecar_file: None,
            version: SchemaVersion::Missing,
            name: String::new(),
            axes: AxisLengths::default(),
            pixel_type: None,
            channels: Vec::new(),
            comment: None,
            time: None,
            exposure_time: None,
            slice_thickness: None,
            pixel_size: None,
            temperature: 0.0,
            gain: 0,
            binning: None,
            detector_id: None,
            detector_model: None,
            detector_manufacturer: None,
            camera_mode: None,
            camera_ref: None,
            voltages: Vec::new(),
            uuid: None,
            position_index: 0,
            timestamps: Vec::new(),
            swapped_z_and_time: false,
            base_file: None,
            files: Vec::new(),
            plane_files: BTreeMap::new(),
            plane_tables: BTreeMap::new(),
            table: MetadataTable::new(),
        }
    }

    /// Number of planes declared by the axis lengths.
    pub fn plane_count(&self) -> usize {
        self.axes.plane_count()
    }
}

/// A parsed acquisition: every stage position plus the dataset-wide table.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Acquisition {
    /// Positions in stable discovery order.
    pub positions: Vec<Position>,

    /// Every key/value seen in any position. For keys written by several
    /// positions the later position wins.
    pub table: MetadataTable,
}

impl Acquisition {
    /// Builds an acquisition from parsed positions, merging their tables in
    /// position order.
    pub fn from_positions(positions: Vec<Position>) -> Self {
        let mut table = MetadataTable::new();
        for position in &positions {
            table.extend(
                position
                    .table
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone())),
            );
        }
        Self { positions, table }
    }

    /// Number of positions (images).
    pub fn image_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_type_codes() {
        assert_eq!(PixelType::from_ij_type(0), Some(PixelType::U8));
        assert_eq!(PixelType::from_ij_type(1), Some(PixelType::U16));
        assert_eq!(PixelType::from_ij_type(7), None);
        assert_eq!(PixelType::U16.bits(), 16);
    }

    #[test]
    fn later_positions_win_in_merged_table() {
        let mut first = Position::new(0, "Pos_0/metadata.txt");
        first.table.insert("Width".into(), "512".into());
        first.table.insert("Prefix".into(), "run".into());
        let mut second = Position::new(1, "Pos_1/metadata.txt");
        second.table.insert("Width".into(), "1024".into());

        let acquisition = Acquisition::from_positions(vec![first, second]);
        assert_eq!(acquisition.image_count(), 2);
        assert_eq!(acquisition.table.get("Width"), Some(&"1024".to_string()));
        assert_eq!(acquisition.table.get("Prefix"), Some(&"run".to_string()));
    }
}

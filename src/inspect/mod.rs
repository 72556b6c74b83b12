//! Acquisition inspection.
//!
//! Summarizes a parsed [`Acquisition`]: per-position dimensions, camera
//! settings and timing, plus how many planes have records and how many
//! candidate image files exist.

mod report;

pub use report::{InspectReport, PositionSection, SummarySection};

use crate::meta::{Acquisition, Position};

/// Options for acquisition inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Stat every candidate image file to count the ones on disk.
    pub check_files: bool,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self { check_files: true }
    }
}

/// Inspect an acquisition and produce a report.
pub fn inspect_acquisition(acquisition: &Acquisition, opts: &InspectOptions) -> InspectReport {
    let positions: Vec<PositionSection> = acquisition
        .positions
        .iter()
        .map(|position| compute_position(position, opts))
        .collect();

    let summary = SummarySection {
        positions: positions.len(),
        planes: acquisition
            .positions
            .iter()
            .map(Position::plane_count)
            .sum(),
        recorded_planes: positions.iter().map(|p| p.recorded_planes).sum(),
        candidate_files: positions.iter().map(|p| p.candidate_files).sum(),
        existing_files: opts
            .check_files
            .then(|| positions.iter().filter_map(|p| p.existing_files).sum()),
        table_entries: acquisition.table.len(),
    };

    InspectReport { summary, positions }
}

fn compute_position(position: &Position, opts: &InspectOptions) -> PositionSection {
    let recorded_planes = (0..position.plane_count())
        .filter(|&plane| position.has_plane(plane))
        .count();

    let existing_files = opts
        .check_files
        .then(|| position.files.iter().filter(|file| file.is_file()).count());

    let camera = match (&position.detector_manufacturer, &position.detector_model) {
        (Some(maker), Some(model)) => Some(format!("{maker} {model}")),
        (None, Some(model)) => Some(model.clone()),
        (Some(maker), None) => Some(maker.clone()),
        (None, None) => position.camera_ref.clone(),
    };

    let time_span = match (position.timestamps.first(), position.timestamps.last()) {
        (Some(&first), Some(&last)) => Some((first, last)),
        _ => None,
    };

    PositionSection {
        name: position.name.clone(),
        metadata_file: position.metadata_file.display().to_string(),
        version: position.version.to_string(),
        x: position.axes.x,
        y: position.axes.y,
        z: position.axes.z,
        channels: position.axes.channel,
        time: position.axes.time,
        bits_per_pixel: position.pixel_type.map(|pixel_type| pixel_type.bits()),
        channel_names: position.channels.clone(),
        swapped_z_and_time: position.swapped_z_and_time,
        exposure_time: position.exposure_time,
        pixel_size: position.pixel_size,
        slice_thickness: position.slice_thickness,
        camera,
        binning: position.binning.clone(),
        gain: position.gain,
        time_span,
        recorded_planes,
        candidate_files: position.files.len(),
        existing_files,
        sidecar: position
            .sidecar_file
            .as_ref()
            .map(|path| path.display().to_string()),
    }
}

//! Plane index and file list construction.
//!
//! After a position's metadata has been parsed, [`build_file_list`] fills
//! its candidate image list, and the lookup methods below resolve a linear
//! plane index to a file, a coordinate or the plane's metadata table.
//!
//! Plane indices follow raster order: Z varies fastest, then channel, then
//! time.

pub mod scan;
pub mod synth;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::MmStackError;
use crate::meta::{
    check_plane_count, Acquisition, Dialect, MetadataTable, PlaneCoord, PlaneKey, Position,
};

static EMPTY_TABLE: MetadataTable = BTreeMap::new();

/// Populates `position.files` with the candidate image for every plane.
///
/// V1 names are synthesized from the base file's pattern; when that yields
/// nothing the metadata file's directory is scanned for TIFFs and the axis
/// lengths are re-derived from their names. Finding no TIFF at all is an
/// error. V2 names are always synthesized.
///
/// Positions whose version was not recognized are left untouched.
pub fn build_file_list(position: &mut Position) -> Result<(), MmStackError> {
    let Some(dialect) = position.version.dialect() else {
        return Ok(());
    };
    info!(
        "{}: building image file list",
        position.metadata_file.display()
    );

    match dialect {
        Dialect::V1 => {
            position.files = synth::v1_file_names(position);
            if position.files.is_empty() {
                let dir = metadata_dir(&position.metadata_file);
                warn!(
                    "{}: could not generate image file names, scanning {}",
                    position.metadata_file.display(),
                    dir.display()
                );
                let scan = scan::scan_image_dir(&dir)?;
                if scan.files.is_empty() {
                    return Err(MmStackError::NoImageFiles { path: dir });
                }
                scan.apply_to(&mut position.axes);
                check_plane_count(position)?;
                position.files = scan.files;
            }
        }
        Dialect::V2 => {
            position.files = synth::v2_file_names(position);
            if position.files.is_empty() {
                warn!(
                    "{}: axis lengths describe no planes, image file list is empty",
                    position.metadata_file.display()
                );
            }
        }
    }
    Ok(())
}

fn metadata_dir(metadata_file: &Path) -> PathBuf {
    match metadata_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

impl Position {
    /// Coordinate of the plane at `plane_index`.
    pub fn plane_coord(&self, plane_index: usize) -> Option<PlaneCoord> {
        self.axes.raster_to_coord(plane_index)
    }

    /// Key of the per-plane metadata table for `plane_index`.
    pub fn plane_key(&self, plane_index: usize) -> Option<PlaneKey> {
        self.plane_coord(plane_index)
            .map(|coord| PlaneKey::new(self.ordinal, coord))
    }

    /// Whether a plane record was read for `plane_index`. Sparse
    /// acquisitions leave some planes without one.
    pub fn has_plane(&self, plane_index: usize) -> bool {
        self.plane_key(plane_index)
            .is_some_and(|key| self.plane_tables.contains_key(&key))
    }

    /// Resolves `plane_index` to an image file.
    ///
    /// When plane records registered files, the file registered for the
    /// plane's coordinate is looked up by name in the candidate list; a plane
    /// with no registration, or whose file is not a candidate, has no
    /// location. Without any registration the candidate list is indexed
    /// directly.
    pub fn location(&self, plane_index: usize) -> Option<&Path> {
        let coord = self.plane_coord(plane_index)?;
        if self.plane_files.is_empty() {
            return self.files.get(plane_index).map(PathBuf::as_path);
        }

        let name = self.plane_files.get(&coord)?.file_name()?;
        self.files
            .iter()
            .find(|file| file.file_name() == Some(name))
            .map(PathBuf::as_path)
    }

    /// Metadata recorded for `plane_index`, or an empty table when the plane
    /// has none.
    pub fn plane_metadata(&self, plane_index: usize) -> &MetadataTable {
        self.plane_key(plane_index)
            .and_then(|key| self.plane_tables.get(&key))
            .unwrap_or(&EMPTY_TABLE)
    }
}

impl Acquisition {
    /// Resolves a plane of the image (position) at `image_index`.
    pub fn location(&self, image_index: usize, plane_index: usize) -> Option<&Path> {
        self.positions.get(image_index)?.location(plane_index)
    }

    /// Metadata recorded for a plane of the image at `image_index`.
    pub fn plane_metadata(&self, image_index: usize, plane_index: usize) -> &MetadataTable {
        self.positions
            .get(image_index)
            .map_or(&EMPTY_TABLE, |position| position.plane_metadata(plane_index))
    }

    /// Every file the acquisition is made of: metadata files, sidecars and,
    /// unless `no_pixels` is set, the candidate image files that exist.
    pub fn used_files(&self, no_pixels: bool) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for position in &self.positions {
            files.push(position.metadata_file.clone());
            if let Some(sidecar) = &position.sidecar_file {
                files.push(sidecar.clone());
            }
            if !no_pixels {
                files.extend(position.files.iter().filter(|file| file.is_file()).cloned());
            }
        }
        files
    }
}

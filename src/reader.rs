//! Acquisition reader: locates each position's `metadata.txt`, parses it
//! and builds its plane index.
//!
//! # Layout
//!
//! A single-position acquisition is a directory holding `metadata.txt` and
//! its images. Multi-position acquisitions keep one such directory per stage
//! position, each named with a `Pos_` marker (`Pos_0`, `run_Pos_1`, ...):
//!
//! ```text
//! acquisition/
//! ├── Pos_0/
//! │   ├── metadata.txt
//! │   └── img_000000000_DAPI_000.tif
//! └── Pos_1/
//!     ├── metadata.txt
//!     └── img_000000000_DAPI_000.tif
//! ```
//!
//! The reader accepts the metadata file, any file beside it, its directory,
//! or (for multi-position data) the directory holding the `Pos_` folders.
//! Positions are parsed independently, in parallel with the `parallel`
//! feature, and merged in discovery order.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::MmStackError;
use crate::index;
use crate::meta::sidecar::{read_sidecar, SIDECAR_FILE};
use crate::meta::{parse_metadata, Acquisition, Dialect, Position};

/// Name of the per-position metadata file.
pub const METADATA_FILE: &str = "metadata.txt";

/// Marker in the name of a per-position directory.
pub const POSITION_DIR_MARKER: &str = "Pos_";

/// Options for reading an acquisition.
#[derive(Clone, Debug)]
pub struct ReadOptions {
    /// Exchange Z and time for V1 positions that declare fewer frames than
    /// slices.
    pub swap_z_and_time: bool,
    /// Largest metadata or sidecar file, in bytes, that will be loaded.
    pub max_metadata_bytes: u64,
    /// Merge `Acqusition.xml` entries into V1 positions' tables.
    pub read_sidecar: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            swap_z_and_time: true,
            max_metadata_bytes: i32::MAX as u64,
            read_sidecar: true,
        }
    }
}

/// Reads every position of the acquisition `input` belongs to.
pub fn read_acquisition(input: &Path, opts: &ReadOptions) -> Result<Acquisition, MmStackError> {
    let metadata_files = discover_metadata_files(input)?;
    info!(
        "{}: reading {} position(s)",
        input.display(),
        metadata_files.len()
    );

    #[cfg(feature = "parallel")]
    let positions: Vec<Position> = metadata_files
        .par_iter()
        .enumerate()
        .map(|(ordinal, file)| read_position(file, ordinal, opts))
        .collect::<Result<_, _>>()?;

    #[cfg(not(feature = "parallel"))]
    let positions: Vec<Position> = metadata_files
        .iter()
        .enumerate()
        .map(|(ordinal, file)| read_position(file, ordinal, opts))
        .collect::<Result<_, _>>()?;

    Ok(Acquisition::from_positions(positions))
}

/// Reads one position from its metadata file.
pub fn read_position(
    metadata_file: &Path,
    ordinal: usize,
    opts: &ReadOptions,
) -> Result<Position, MmStackError> {
    info!("{}: reading metadata file", metadata_file.display());
    let text = load_metadata_text(metadata_file, opts.max_metadata_bytes)?;
    let mut position = parse_metadata(&text, ordinal, metadata_file, opts.swap_z_and_time)?;

    if opts.read_sidecar && position.version.dialect() == Some(Dialect::V1) {
        let sidecar = metadata_file.with_file_name(SIDECAR_FILE);
        if sidecar.is_file() {
            check_size(&sidecar, opts.max_metadata_bytes)?;
            let entries = read_sidecar(&sidecar)?;
            debug!(
                "{}: merging {} sidecar entries",
                sidecar.display(),
                entries.len()
            );
            position.table.extend(entries);
            position.sidecar_file = Some(sidecar);
        }
    }

    index::build_file_list(&mut position)?;
    Ok(position)
}

/// Loads a metadata file as text, refusing files larger than `limit` bytes.
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn load_metadata_text(path: &Path, limit: u64) -> Result<String, MmStackError> {
    check_size(path, limit)?;
    let bytes = fs::read(path).map_err(MmStackError::Io)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn check_size(path: &Path, limit: u64) -> Result<(), MmStackError> {
    let size = fs::metadata(path).map_err(MmStackError::Io)?.len();
    if size > limit {
        return Err(MmStackError::MetadataTooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        });
    }
    Ok(())
}

/// Finds the metadata file of every position `input` belongs to, in stable
/// order.
pub fn discover_metadata_files(input: &Path) -> Result<Vec<PathBuf>, MmStackError> {
    let is_dir = fs::metadata(input).map_err(MmStackError::Io)?.is_dir();
    let dir = if is_dir {
        input.to_path_buf()
    } else {
        match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    };

    let candidates = if is_position_dir(&dir) {
        let root = match dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        position_metadata_files(&root)?
    } else if is_dir && !dir.join(METADATA_FILE).is_file() {
        let nested = position_metadata_files(&dir)?;
        if nested.is_empty() {
            vec![dir.join(METADATA_FILE)]
        } else {
            nested
        }
    } else {
        vec![dir.join(METADATA_FILE)]
    };

    for candidate in &candidates {
        if !candidate.is_file() {
            return Err(MmStackError::MissingCompanion {
                path: candidate.clone(),
            });
        }
    }
    Ok(candidates)
}

fn is_position_dir(dir: &Path) -> bool {
    dir.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(POSITION_DIR_MARKER))
}

/// `metadata.txt` inside each `Pos_` directory directly below `root`,
/// sorted by directory name.
fn position_metadata_files(root: &Path) -> Result<Vec<PathBuf>, MmStackError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| MmStackError::DirectoryScan {
            path: root.to_path_buf(),
            message: format!("failed while listing position directories: {source}"),
        })?;
        if entry.file_type().is_dir() && is_position_dir(entry.path()) {
            files.push(entry.path().join(METADATA_FILE));
        }
    }
    Ok(files)
}

//! Directory fallback for V1 positions whose file names cannot be synthesized.
//!
//! Every TIFF beside the metadata file is taken as a plane image. Names are
//! expected to follow `prefix_T_C_Z.tif`; the distinct tokens in each slot
//! give the axis lengths.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::info;
use walkdir::WalkDir;

use crate::error::MmStackError;
use crate::meta::AxisLengths;

const TIFF_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

/// TIFF files found in a directory plus the axis lengths their names imply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// TIFF files sorted by file name.
    pub files: Vec<PathBuf>,
    pub time: usize,
    pub channel: usize,
    pub z: usize,
}

impl ScanResult {
    /// Overwrites Z, channel and time in `axes` with the counts observed.
    /// Axes no file name contributed a token to are left alone.
    pub fn apply_to(&self, axes: &mut AxisLengths) {
        if self.z > 0 {
            axes.z = self.z;
        }
        if self.channel > 0 {
            axes.channel = self.channel;
        }
        if self.time > 0 {
            axes.time = self.time;
        }
    }
}

/// Lists the TIFF files directly inside `dir` and counts the distinct time,
/// channel and Z tokens in their names.
///
/// Tokens are taken from the file stem. Files whose stems have fewer than
/// four `_`-separated blocks are listed but contribute no tokens.
pub fn scan_image_dir(dir: &Path) -> Result<ScanResult, MmStackError> {
    let mut files = Vec::new();
    let mut times = BTreeSet::new();
    let mut channels = BTreeSet::new();
    let mut depths = BTreeSet::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| MmStackError::DirectoryScan {
            path: dir.to_path_buf(),
            message: format!("failed while listing image files: {source}"),
        })?;
        if !entry.file_type().is_file() || !is_tiff(entry.path()) {
            continue;
        }

        if let Some(stem) = entry.path().file_stem().and_then(|stem| stem.to_str()) {
            let blocks: Vec<&str> = stem.split('_').collect();
            if blocks.len() >= 4 {
                times.insert(blocks[1].to_string());
                channels.insert(blocks[2].to_string());
                depths.insert(blocks[3].to_string());
            }
        }
        files.push(entry.into_path());
    }

    info!(
        "{}: found {} TIFF file(s) ({} time, {} channel, {} z token(s))",
        dir.display(),
        files.len(),
        times.len(),
        channels.len(),
        depths.len()
    );

    Ok(ScanResult {
        files,
        time: times.len(),
        channel: channels.len(),
        z: depths.len(),
    })
}

fn is_tiff(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    TIFF_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

//! Image file name synthesis.
//!
//! Both generators emit one name per plane in raster order (time outermost,
//! then channel, then Z), so the list can be indexed by plane index.

use std::path::{Path, PathBuf};

use crate::meta::{Position, MAX_PLANE_COUNT};

/// Directory V2 acquisitions keep their images in, next to `metadata.txt`.
pub const V2_IMAGE_DIR: &str = "img";
const V2_PREFIX: &str = "img";
const V2_CHANNEL_WIDTH: usize = 3;
const V2_POSITION_WIDTH: usize = 3;
const V2_TIME_WIDTH: usize = 9;
const V2_Z_WIDTH: usize = 3;

/// Field layout recovered from a V1 base file name such as
/// `img_000000000_DAPI_000.tif`.
#[derive(Clone, Debug, PartialEq, Eq)]
struct V1Template {
    prefix: String,
    first_width: usize,
    last_width: usize,
    extension: String,
}

impl V1Template {
    /// Splits on `_`. The first block is the prefix, the second block fixes
    /// the first counter's width and the last block the second counter's
    /// width and the extension; anything between them is the channel.
    fn from_file_name(name: &str) -> Option<Self> {
        let blocks: Vec<&str> = name.split('_').collect();
        if blocks.len() < 4 {
            return None;
        }
        let last = blocks[blocks.len() - 1];
        let (stem, extension) = match last.find('.') {
            Some(dot) => (&last[..dot], &last[dot..]),
            None => (last, ".tif"),
        };
        Some(Self {
            prefix: blocks[0].to_string(),
            first_width: blocks[1].len(),
            last_width: stem.len(),
            extension: extension.to_string(),
        })
    }

    fn name(&self, first: usize, channel: &str, last: usize) -> String {
        format!(
            "{}_{:0first$}_{}_{:0last$}{}",
            self.prefix,
            first,
            channel,
            last,
            self.extension,
            first = self.first_width,
            last = self.last_width,
        )
    }
}

/// Generates V1 names from the base file's pattern.
///
/// On disk the first counter is the acquisition's time index and the second
/// its Z index. When Z and time were swapped for this position the logical
/// axes are exchanged, so Z goes in the first slot and time in the second.
///
/// Returns an empty list when there is no usable base file or fewer channel
/// names than channels.
pub fn v1_file_names(position: &Position) -> Vec<PathBuf> {
    let Some(base) = position.base_file.as_deref() else {
        return Vec::new();
    };
    let Some(template) = base
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(V1Template::from_file_name)
    else {
        return Vec::new();
    };
    let axes = position.axes;
    if position.channels.len() < axes.channel {
        return Vec::new();
    }
    let Some(count) = synthesis_count(position) else {
        return Vec::new();
    };

    let dir = base.parent().unwrap_or_else(|| Path::new(""));
    let mut files = Vec::with_capacity(count);
    for t in 0..axes.time {
        for channel in &position.channels[..axes.channel] {
            for z in 0..axes.z {
                let name = if position.swapped_z_and_time {
                    template.name(z, channel, t)
                } else {
                    template.name(t, channel, z)
                };
                files.push(dir.join(name));
            }
        }
    }
    files
}

/// Generates V2 names with the fixed field widths the acquisition software
/// uses: `img_channel000_position000_time000000000_z000.tif`.
///
/// Names are placed in the `img` directory next to the metadata file when it
/// exists, otherwise beside the metadata file itself.
pub fn v2_file_names(position: &Position) -> Vec<PathBuf> {
    let Some(count) = synthesis_count(position) else {
        return Vec::new();
    };
    let parent = position
        .metadata_file
        .parent()
        .unwrap_or_else(|| Path::new(""));
    let image_dir = parent.join(V2_IMAGE_DIR);
    let dir = if image_dir.is_dir() {
        image_dir
    } else {
        parent.to_path_buf()
    };

    let axes = position.axes;
    let mut files = Vec::with_capacity(count);
    for t in 0..axes.time {
        for c in 0..axes.channel {
            for z in 0..axes.z {
                files.push(dir.join(v2_file_name(c, position.position_index, t, z)));
            }
        }
    }
    files
}

/// Capacity hint for a synthesized list, or `None` when the extents describe
/// no planes or more than an acquisition can hold. The hint is capped by the
/// number of registered files since declared extents are not trusted.
fn synthesis_count(position: &Position) -> Option<usize> {
    let count = position
        .axes
        .checked_plane_count()
        .filter(|&count| count > 0 && count <= MAX_PLANE_COUNT)?;
    Some(count.min(position.plane_files.len().max(1)))
}

/// Formats one V2 image file name.
pub fn v2_file_name(channel: usize, position: usize, time: usize, z: usize) -> String {
    format!(
        "{V2_PREFIX}_channel{channel:0cw$}_position{position:0pw$}_time{time:0tw$}_z{z:0zw$}.tif",
        cw = V2_CHANNEL_WIDTH,
        pw = V2_POSITION_WIDTH,
        tw = V2_TIME_WIDTH,
        zw = V2_Z_WIDTH,
    )
}

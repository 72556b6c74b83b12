#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
}

/// Creates empty image files named `names` inside `dir`.
pub fn touch_images<I, S>(dir: &Path, names: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fs::create_dir_all(dir).expect("create image dir");
    for name in names {
        fs::write(dir.join(name.as_ref()), b"II*\0").expect("write image file");
    }
}

/// A 1.4-era `metadata.txt` with one `FrameKey-T-C-Z` record per entry in
/// `records`.
#[derive(Clone, Debug)]
pub struct V1Metadata {
    pub prefix: String,
    pub file_prefix: String,
    pub frames: usize,
    pub slices: usize,
    pub channels: Vec<String>,
    pub position_index: usize,
    pub ij_type: i64,
    /// `(t, c, z)` of every plane record, in file order.
    pub records: Vec<(usize, usize, usize)>,
    /// Elapsed time written into each record, keyed by record position.
    pub elapsed_ms: Vec<f64>,
    /// Write a `FileName` entry into every record.
    pub record_file_names: bool,
}

impl V1Metadata {
    /// Full acquisition: one record per (t, c, z) in acquisition order.
    pub fn new(frames: usize, slices: usize, channels: &[&str]) -> Self {
        let mut records = Vec::new();
        for t in 0..frames {
            for c in 0..channels.len() {
                for z in 0..slices {
                    records.push((t, c, z));
                }
            }
        }
        let elapsed_ms = (0..records.len()).map(|i| i as f64 * 250.0).collect();
        Self {
            prefix: "beads".to_string(),
            file_prefix: "img".to_string(),
            frames,
            slices,
            channels: channels.iter().map(|name| name.to_string()).collect(),
            position_index: 0,
            ij_type: 1,
            records,
            elapsed_ms,
            record_file_names: true,
        }
    }

    pub fn file_name(&self, t: usize, c: usize, z: usize) -> String {
        format!(
            "{}_{:09}_{}_{:03}.tif",
            self.file_prefix, t, self.channels[c], z
        )
    }

    /// Every file name the records refer to.
    pub fn file_names(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|&(t, c, z)| self.file_name(t, c, z))
            .collect()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("{\n  \"Summary\": {\n");
        let _ = writeln!(out, "    \"Slices\": {},", self.slices);
        out.push_str("    \"UUID\": \"1b6e7f0c-2d1a-4c55-9d43-1f0d9b1b2c3d\",\n");
        let _ = writeln!(out, "    \"Prefix\": \"{}\",", self.prefix);
        out.push_str("    \"MicroManagerVersion\": \"1.4.23 20180220\",\n");
        let _ = writeln!(out, "    \"Frames\": {},", self.frames);
        out.push_str("    \"ChNames\": [\n");
        let names: Vec<String> = self
            .channels
            .iter()
            .map(|name| format!("      \"{name}\""))
            .collect();
        out.push_str(&names.join(",\n"));
        out.push_str("\n    ],\n");
        out.push_str("    \"Width\": 512,\n");
        out.push_str("    \"Height\": 256,\n");
        let _ = writeln!(out, "    \"IJType\": {},", self.ij_type);
        let _ = writeln!(out, "    \"Channels\": {},", self.channels.len());
        out.push_str("    \"PixelSize_um\": 0.65,\n");
        out.push_str("    \"z-step_um\": 0.5,\n");
        out.push_str("    \"Time\": \"2019-04-23 10:54:46 +0200\",\n");
        out.push_str("    \"Comment\": \"integration fixture\",\n");
        let _ = writeln!(out, "    \"PositionIndex\": {}", self.position_index);
        out.push_str("  }");

        for (i, &(t, c, z)) in self.records.iter().enumerate() {
            let elapsed = self.elapsed_ms.get(i).copied().unwrap_or(0.0);
            out.push_str(",\n");
            let _ = writeln!(out, "  \"FrameKey-{t}-{c}-{z}\": {{");
            out.push_str("    \"Core-Camera\": \"Camera\",\n");
            out.push_str("    \"Camera-Binning\": \"2\",\n");
            out.push_str("    \"Camera-Gain\": \"4.6\",\n");
            out.push_str("    \"Camera-CameraName\": \"DemoCamera-MultiMode\",\n");
            out.push_str("    \"Exposure-ms\": 50,\n");
            let _ = writeln!(out, "    \"ElapsedTime-ms\": {elapsed},");
            out.push_str("    \"DAC-1-Volts\": 1.25,\n");
            let _ = writeln!(out, "    \"Slice\": {z},");
            let _ = writeln!(out, "    \"Frame\": {t},");
            if self.record_file_names {
                let _ = writeln!(out, "    \"ChannelIndex\": {c},");
                let _ = writeln!(out, "    \"FileName\": \"{}\"", self.file_name(t, c, z));
            } else {
                let _ = writeln!(out, "    \"ChannelIndex\": {c}");
            }
            out.push_str("  }");
        }
        out.push_str("\n}\n");
        out
    }
}

/// A 2.x `metadata.txt` with a `Coords-`/`Metadata-` pair per plane record.
#[derive(Clone, Debug)]
pub struct V2Metadata {
    pub prefix: String,
    pub frames: usize,
    pub slices: usize,
    pub channels: Vec<String>,
    pub position_index: usize,
    /// `(t, c, z)` of every plane record, in file order.
    pub records: Vec<(usize, usize, usize)>,
}

impl V2Metadata {
    pub fn new(frames: usize, slices: usize, channels: &[&str]) -> Self {
        let mut records = Vec::new();
        for t in 0..frames {
            for c in 0..channels.len() {
                for z in 0..slices {
                    records.push((t, c, z));
                }
            }
        }
        Self {
            prefix: "cells".to_string(),
            frames,
            slices,
            channels: channels.iter().map(|name| name.to_string()).collect(),
            position_index: 0,
            records,
        }
    }

    pub fn file_name(&self, t: usize, c: usize, z: usize) -> String {
        format!(
            "img_channel{:03}_position{:03}_time{:09}_z{:03}.tif",
            c, self.position_index, t, z
        )
    }

    pub fn file_names(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|&(t, c, z)| self.file_name(t, c, z))
            .collect()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("{\n  \"Summary\": {\n");
        let _ = writeln!(out, "    \"Prefix\": \"{}\",", self.prefix);
        out.push_str("    \"MicroManagerVersion\": \"2.0.0-gamma1 20200514\",\n");
        let _ = writeln!(out, "    \"Slices\": {},", self.slices);
        let _ = writeln!(out, "    \"Channels\": {},", self.channels.len());
        let _ = writeln!(out, "    \"Frames\": {},", self.frames);
        let names: Vec<String> = self
            .channels
            .iter()
            .map(|name| format!("\"{name}\""))
            .collect();
        let _ = writeln!(out, "    \"ChNames\": [{}],", names.join(", "));
        out.push_str("    \"Width\": 0,\n");
        out.push_str("    \"Height\": 0,\n");
        out.push_str("    \"IJType\": 0,\n");
        out.push_str("    \"IntendedDimensions\": {\n");
        out.push_str("      \"time\": 1000,\n");
        out.push_str("      \"z\": 1000\n");
        out.push_str("    },\n");
        out.push_str("    \"UserData\": {\n");
        out.push_str("      \"Operator\": {\n");
        out.push_str("        \"type\": \"STRING\",\n");
        out.push_str("        \"scalar\": \"lab\"\n");
        out.push_str("      }\n");
        out.push_str("    },\n");
        let _ = writeln!(out, "    \"PositionIndex\": {}", self.position_index);
        out.push_str("  }");

        for &(t, c, z) in &self.records {
            let name = self.file_name(t, c, z);
            out.push_str(",\n");
            let _ = writeln!(out, "  \"Coords-Default/{name}\": {{");
            let _ = writeln!(out, "    \"Frame\": {t},");
            let _ = writeln!(out, "    \"ChannelIndex\": {c},");
            let _ = writeln!(out, "    \"Slice\": {z},");
            let _ = writeln!(out, "    \"PositionIndex\": {}", self.position_index);
            out.push_str("  },\n");
            let _ = writeln!(out, "  \"Metadata-Default/{name}\": {{");
            out.push_str("    \"Width\": 128,\n");
            out.push_str("    \"Height\": 64,\n");
            let _ = writeln!(out, "    \"ElapsedTime-ms\": {},", (t * 1000 + c * 10 + z) as f64);
            out.push_str("    \"Exposure-ms\": 20.0,\n");
            let _ = writeln!(out, "    \"UUID\": \"plane-{t}-{c}-{z}\",");
            let _ = writeln!(out, "    \"FileName\": \"{name}\",");
            out.push_str("    \"UserData\": {\n");
            out.push_str("      \"Core-Camera\": {\n");
            out.push_str("        \"type\": \"STRING\",\n");
            out.push_str("        \"scalar\": \"HamamatsuHam_DCAM\"\n");
            out.push_str("      },\n");
            out.push_str("      \"HamamatsuHam_DCAM-Binning\": {\n");
            out.push_str("        \"type\": \"STRING\",\n");
            out.push_str("        \"scalar\": \"1x1\"\n");
            out.push_str("      },\n");
            out.push_str("      \"HamamatsuHam_DCAM-CameraName\": {\n");
            out.push_str("        \"type\": \"STRING\",\n");
            out.push_str("        \"scalar\": \"C11440-22CU\"\n");
            out.push_str("      }\n");
            out.push_str("    }\n");
            out.push_str("  }");
        }
        out.push_str("\n}\n");
        out
    }
}

/// Writes a V1 position (metadata plus every referenced image) into `dir`.
pub fn write_v1_position(dir: &Path, metadata: &V1Metadata) {
    write_file(&dir.join("metadata.txt"), &metadata.render());
    touch_images(dir, metadata.file_names());
}

/// Writes a V2 position into `dir`, images under `dir/img`.
pub fn write_v2_position(dir: &Path, metadata: &V2Metadata) {
    write_file(&dir.join("metadata.txt"), &metadata.render());
    touch_images(&dir.join("img"), metadata.file_names());
}

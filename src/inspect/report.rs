//! Inspect report types and terminal formatting.

use serde::Serialize;
use std::fmt;

/// Inner width of the report boxes, in characters.
const BOX_WIDTH: usize = 59;

/// The result of inspecting an acquisition.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    /// Counts across every position.
    pub summary: SummarySection,
    /// One entry per position, in acquisition order.
    pub positions: Vec<PositionSection>,
}

/// Acquisition-wide counts.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SummarySection {
    /// Number of positions (images).
    pub positions: usize,
    /// Planes declared across all positions.
    pub planes: usize,
    /// Planes with a metadata record.
    pub recorded_planes: usize,
    /// Candidate image files across all positions.
    pub candidate_files: usize,
    /// Candidate image files present on disk, when checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_files: Option<usize>,
    /// Entries in the acquisition-wide metadata table.
    pub table_entries: usize,
}

/// Summary of one position.
#[derive(Clone, Debug, Serialize)]
pub struct PositionSection {
    pub name: String,
    pub metadata_file: String,
    /// Detected schema version, e.g. `1.4 (V1)`.
    pub version: String,
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub channels: usize,
    pub time: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bits_per_pixel: Option<u32>,
    pub channel_names: Vec<String>,
    pub swapped_z_and_time: bool,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<f64>,
    /// Micrometers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_size: Option<f64>,
    /// Micrometers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binning: Option<String>,
    pub gain: i32,
    /// First and last elapsed time, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_span: Option<(f64, f64)>,
    pub recorded_planes: usize,
    pub candidate_files: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_files: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidecar: Option<String>,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "╭─────────────────────────────────────────────────────────────╮")?;
        writeln!(f, "│              🔬  Acquisition Inspection Report              │")?;
        writeln!(f, "╰─────────────────────────────────────────────────────────────╯")?;
        writeln!(f)?;

        self.fmt_summary(f)?;

        for position in &self.positions {
            writeln!(f)?;
            position.fmt_section(f)?;
        }

        Ok(())
    }
}

impl InspectReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;

        section_top(f, "Summary")?;
        blank(f)?;
        row(f, &format!("  Positions:     {:>8}", format_number(s.positions)))?;
        row(f, &format!("  Planes:        {:>8}", format_number(s.planes)))?;
        row(
            f,
            &format!("  Recorded:      {}", count_of(s.recorded_planes, s.planes)),
        )?;
        row(
            f,
            &format!("  Image files:   {:>8}", format_number(s.candidate_files)),
        )?;
        if let Some(existing) = s.existing_files {
            row(
                f,
                &format!("  On disk:       {}", count_of(existing, s.candidate_files)),
            )?;
        }
        row(
            f,
            &format!("  Table entries: {:>8}", format_number(s.table_entries)),
        )?;
        blank(f)?;
        section_bottom(f)
    }
}

impl PositionSection {
    fn fmt_section(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section_top(f, &truncate_label(&self.name, BOX_WIDTH - 6))?;
        blank(f)?;
        row(f, &format!("  Version:       {}", self.version))?;
        row(
            f,
            &format!(
                "  Dimensions:    X {} · Y {} · Z {} · C {} · T {}",
                self.x, self.y, self.z, self.channels, self.time
            ),
        )?;
        if let Some(bits) = self.bits_per_pixel {
            row(f, &format!("  Pixel type:    {bits}-bit unsigned"))?;
        }
        if !self.channel_names.is_empty() {
            row(
                f,
                &format!(
                    "  Channels:      {}",
                    truncate_label(&self.channel_names.join(", "), BOX_WIDTH - 17)
                ),
            )?;
        }
        if self.swapped_z_and_time {
            row(f, "  ⚠ Z and time were swapped")?;
        }

        blank(f)?;
        if let Some(exposure) = self.exposure_time {
            row(f, &format!("  Exposure:      {exposure:.4} s"))?;
        }
        if let Some(size) = self.pixel_size {
            row(f, &format!("  Pixel size:    {size} µm"))?;
        }
        if let Some(step) = self.slice_thickness {
            row(f, &format!("  Z step:        {step} µm"))?;
        }
        if let Some(camera) = &self.camera {
            row(f, &format!("  Camera:        {}", truncate_label(camera, BOX_WIDTH - 17)))?;
        }
        if let Some(binning) = &self.binning {
            row(f, &format!("  Binning:       {binning}"))?;
        }
        if self.gain != 0 {
            row(f, &format!("  Gain:          {}", self.gain))?;
        }
        if let Some((first, last)) = self.time_span {
            row(f, &format!("  Elapsed:       {first:.3} s to {last:.3} s"))?;
        }

        blank(f)?;
        row(
            f,
            &format!(
                "  Plane records: {:>8}",
                format_number(self.recorded_planes)
            ),
        )?;
        row(
            f,
            &format!(
                "  Image files:   {:>8}",
                format_number(self.candidate_files)
            ),
        )?;
        if let Some(existing) = self.existing_files {
            let marker = if existing == self.candidate_files {
                "✓"
            } else {
                "⚠"
            };
            row(
                f,
                &format!(
                    "  {marker} On disk:     {:>8} of {}",
                    format_number(existing),
                    format_number(self.candidate_files)
                ),
            )?;
        }
        blank(f)?;
        section_bottom(f)
    }
}

fn section_top(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let used = title.chars().count() + 3;
    writeln!(
        f,
        "┌─ {} {}┐",
        title,
        "─".repeat(BOX_WIDTH.saturating_sub(used))
    )
}

fn section_bottom(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "└{}┘", "─".repeat(BOX_WIDTH))
}

fn blank(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    row(f, "")
}

/// Writes one boxed line, padded to the box width.
fn row(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    writeln!(f, "│ {:<width$}│", text, width = BOX_WIDTH - 1)
}

/// Renders a count with `,` between groups of three digits.
fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let lead = match digits.len() % 3 {
        0 => 3,
        rem => rem,
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    grouped.push_str(&digits[..lead]);
    for group in digits.as_bytes()[lead..].chunks(3) {
        grouped.push(',');
        grouped.extend(group.iter().map(|&b| char::from(b)));
    }
    grouped
}

/// Renders `part of total (share)` for the summary rows. A zero total has no
/// share.
fn count_of(part: usize, total: usize) -> String {
    let share = if total == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", part as f64 * 100.0 / total as f64)
    };
    format!(
        "{:>8} of {} ({share})",
        format_number(part),
        format_number(total)
    )
}

/// Truncate a label to at most `max_len` characters.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_grouped_by_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(123456), "123,456");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn count_of_reports_share() {
        assert_eq!(count_of(0, 0), "       0 of 0 (n/a)");
        assert_eq!(count_of(1, 3), "       1 of 3 (33.3%)");
        assert_eq!(count_of(1200, 2400), "   1,200 of 2,400 (50.0%)");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("verylonglabel", 10), "verylongl…");
        assert_eq!(truncate_label("µµµµµµ", 4), "µµµ…");
    }

    #[test]
    fn test_rows_have_constant_width() {
        struct Rows;
        impl fmt::Display for Rows {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                section_top(f, "Summary")?;
                row(f, "  Pixel size:    0.65 µm")?;
                section_bottom(f)
            }
        }
        let rendered = Rows.to_string();
        let widths: Vec<usize> = rendered.lines().map(|line| line.chars().count()).collect();
        assert_eq!(widths, vec![BOX_WIDTH + 2; 3]);
    }
}

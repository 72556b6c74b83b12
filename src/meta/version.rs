//! Schema dialect detection from the embedded `MicroManagerVersion` marker.

use serde::Serialize;
use std::fmt;

/// The marker key whose value carries the acquisition software version.
pub const VERSION_MARKER: &str = "MicroManagerVersion";

/// Schema version detected in a metadata payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaVersion {
    /// Flattened `FrameKey-T-C-Z` records (1.4 and later 1.x releases).
    V1 { minor: u32 },
    /// `Coords-`/`Metadata-` records referencing synthesized file names.
    V2 { minor: u32 },
    /// A version marker was found but names a release neither dialect covers.
    Unsupported { major: u32, minor: u32 },
    /// No version marker, or no digits after it.
    Missing,
}

/// The two grammars the parser understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    V1,
    V2,
}

impl SchemaVersion {
    /// Classifies a full metadata text.
    pub fn detect(text: &str) -> Self {
        let Some(start) = text.find(VERSION_MARKER) else {
            return SchemaVersion::Missing;
        };
        let rest = &text[start + VERSION_MARKER.len()..];
        let end = rest.find([',', '\n']).unwrap_or(rest.len());

        let mut numbers = digit_runs(&rest[..end]);
        let Some(major) = numbers.next() else {
            return SchemaVersion::Missing;
        };
        let minor = numbers.next().unwrap_or(0);
        Self::from_parts(major, minor)
    }

    /// Classifies an explicit major/minor pair.
    pub fn from_parts(major: u32, minor: u32) -> Self {
        match (major, minor) {
            (1, minor) if minor >= 4 => SchemaVersion::V1 { minor },
            (2, minor) => SchemaVersion::V2 { minor },
            (major, minor) => SchemaVersion::Unsupported { major, minor },
        }
    }

    /// The grammar to parse this payload with, if any.
    pub fn dialect(&self) -> Option<Dialect> {
        match self {
            SchemaVersion::V1 { .. } => Some(Dialect::V1),
            SchemaVersion::V2 { .. } => Some(Dialect::V2),
            SchemaVersion::Unsupported { .. } | SchemaVersion::Missing => None,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V1 { minor } => write!(f, "1.{minor} (V1)"),
            SchemaVersion::V2 { minor } => write!(f, "2.{minor} (V2)"),
            SchemaVersion::Unsupported { major, minor } => {
                write!(f, "{major}.{minor} (unsupported)")
            }
            SchemaVersion::Missing => write!(f, "unknown"),
        }
    }
}

fn digit_runs(text: &str) -> impl Iterator<Item = u32> + '_ {
    text.split(|ch: char| !ch.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .filter_map(|run| run.parse::<u32>().ok())
}

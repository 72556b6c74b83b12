//! `Acqusition.xml` reader.
//!
//! Older acquisitions may carry a flat XML companion next to the metadata
//! text (the file name's spelling is what the acquisition software writes):
//!
//! ```xml
//! <acquisition>
//!   <entry key="Objective" value="60x"/>
//! </acquisition>
//! ```
//!
//! Every `<entry>` with both attributes is returned in document order.

use std::fs;
use std::path::Path;

use roxmltree::Document;

use crate::error::MmStackError;

/// File name of the XML sidecar.
pub const SIDECAR_FILE: &str = "Acqusition.xml";

/// Reads the sidecar at `path` into ordered key/value pairs. Bytes that are
/// not valid UTF-8 are replaced, as for the metadata text.
pub fn read_sidecar(path: &Path) -> Result<Vec<(String, String)>, MmStackError> {
    let bytes = fs::read(path)?;
    parse_sidecar_str(&String::from_utf8_lossy(&bytes), path)
}

/// Parses sidecar XML from a string. `path` is used in errors only.
pub fn parse_sidecar_str(xml: &str, path: &Path) -> Result<Vec<(String, String)>, MmStackError> {
    let sanitized = sanitize_xml(xml);
    let document = Document::parse(&sanitized).map_err(|source| MmStackError::SidecarParse {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = document
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == "entry")
        .filter_map(|node| {
            let key = node.attribute("key")?;
            let value = node.attribute("value")?;
            Some((key.to_string(), value.to_string()))
        })
        .collect();
    Ok(entries)
}

/// Drops control characters XML 1.0 does not allow.
fn sanitize_xml(xml: &str) -> String {
    xml.chars()
        .filter(|&ch| !ch.is_control() || matches!(ch, '\t' | '\n' | '\r'))
        .collect()
}

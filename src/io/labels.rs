//! Label files: one circle per line as `cx cy r`.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::Circle;

/// Parse label text.
///
/// Blank lines are skipped. Reading stops at the first line whose first three
/// fields are not all numbers; everything read up to that point is kept.
/// Fields after the third are ignored.
pub fn parse_labels(text: &str) -> Vec<Circle> {
    parse_label_bytes(text.as_bytes())
}

/// Parse raw label file contents. A line that is not valid UTF-8 ends reading
/// like any other unparsable line.
pub fn parse_label_bytes(bytes: &[u8]) -> Vec<Circle> {
    let mut out = Vec::new();
    for raw in bytes.split(|&b| b == b'\n') {
        let Ok(line) = std::str::from_utf8(raw) else {
            log::debug!("label parsing stopped at a non UTF-8 line after {} circles", out.len());
            break;
        };
        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else {
            continue;
        };
        let parsed = (
            first.parse::<f32>(),
            fields.next().map(str::parse::<f32>),
            fields.next().map(str::parse::<f32>),
        );
        match parsed {
            (Ok(x), Some(Ok(y)), Some(Ok(r))) => out.push(Circle::new(x, y, r)),
            _ => {
                log::debug!("label parsing stopped at {:?}", line);
                break;
            }
        }
    }
    out
}

/// Read a label file
pub fn read_labels(path: impl AsRef<Path>) -> Result<Vec<Circle>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(parse_label_bytes(&bytes))
}

/// Serialize circles in label format
pub fn format_labels(circles: &[Circle]) -> String {
    let mut out = String::new();
    for c in circles {
        let _ = writeln!(out, "{} {} {}", c.x, c.y, c.radius);
    }
    out
}

/// Write circles as a label file, replacing any existing file
pub fn write_labels(path: impl AsRef<Path>, circles: &[Circle]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, format_labels(circles)).map_err(|e| Error::io(path, e))
}

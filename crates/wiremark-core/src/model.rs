use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned rectangle in page space, (x0, y0) to (x1, y1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect { x0, y0, x1, y1 }
    }

    pub fn horizontal_center(&self) -> f64 {
        self.x0 + (self.x1 - self.x0) / 2.0
    }

    pub fn vertical_center(&self) -> f64 {
        self.y0 + (self.y1 - self.y0) / 2.0
    }
}

/// Outcome of resolving one circuit against the reference table.
///
/// The sentinel variants render into the output PDF as label text, so a
/// circuit with no spreadsheet row is visibly marked rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialValue {
    Resolved {
        serial: String,
        /// "SN GROUP" column value when that column exists. Looked up but
        /// not rendered into the label.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        group: Option<String>,
    },
    NotFound,
    FormatError,
}

impl fmt::Display for SerialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialValue::Resolved { serial, .. } => write!(f, "{serial}"),
            SerialValue::NotFound => write!(f, "not found"),
            SerialValue::FormatError => write!(f, "format error"),
        }
    }
}

impl SerialValue {
    pub fn is_resolved(&self) -> bool {
        matches!(self, SerialValue::Resolved { .. })
    }
}

/// One circuit occurrence located in the drawing.
///
/// Produced by the extractor, enriched by the matcher (`serial`), consumed
/// by the annotation writer. A circuit number may appear several times on a
/// page; each textual match gets its own record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatedCircuit {
    /// Zero-based page number.
    pub page_index: usize,
    /// Digits extracted from the drawing text. Display key, and after
    /// integer coercion the spreadsheet join key.
    pub circuit_number: String,
    /// The literal substring the pattern matched, used to re-locate the
    /// occurrence geometrically.
    pub match_text: String,
    /// First geometric occurrence of `match_text` on the page.
    pub bounds: Rect,
    /// Page rotation in degrees at extraction time, normalized to [0, 360).
    pub page_rotation: i32,
    /// True when the rectangle's horizontal midpoint sits strictly left of
    /// the page's horizontal midpoint. Drives the annotation offset side.
    pub is_left_half: bool,
    pub page_width: f64,
    pub page_height: f64,
    /// Part-number tokens found anywhere on the same page, first-seen order,
    /// no duplicates. Optional disambiguating join keys for the matcher.
    pub part_numbers: Vec<String>,
    /// Set by the matcher; `None` until it runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<SerialValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_centers() {
        let r = Rect::new(100.0, 200.0, 140.0, 210.0);
        assert_eq!(r.horizontal_center(), 120.0);
        assert_eq!(r.vertical_center(), 205.0);
    }

    #[test]
    fn sentinel_labels() {
        assert_eq!(SerialValue::NotFound.to_string(), "not found");
        assert_eq!(SerialValue::FormatError.to_string(), "format error");
        let resolved = SerialValue::Resolved {
            serial: "AB12".into(),
            group: Some("G7".into()),
        };
        assert_eq!(resolved.to_string(), "AB12");
    }
}

//! Label insertion into the drawing.
//!
//! Each matched record gets its serial number stamped in red next to its
//! bounding box, offset by the page rotation and page half, rotated to
//! match the page. The output is written to a new file; the input is never
//! touched.

use crate::error::WiremarkError;
use crate::extract::content::inherited_page_attr;
use crate::model::LocatedCircuit;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::Path;

/// Font resource name registered on annotated pages.
const LABEL_FONT: &str = "FSer";
const LABEL_FONT_SIZE: f64 = 10.0;

/// Insertion point for a record's label.
///
/// Returns `None` for rotations outside the four axis-aligned states.
/// There is no offset rule for those; callers skip the record rather than
/// guess one.
pub fn annotation_point(record: &LocatedCircuit) -> Option<(f64, f64)> {
    let r = &record.bounds;
    let point = match record.page_rotation {
        0 => {
            if record.is_left_half {
                (r.x0 - 90.0, r.vertical_center())
            } else {
                (r.x1 + 90.0, r.vertical_center())
            }
        }
        90 => {
            if record.is_left_half {
                (r.horizontal_center() + 50.0, r.y0 - 10.0)
            } else {
                (r.horizontal_center() + 50.0, r.y1 + 10.0)
            }
        }
        180 => {
            if record.is_left_half {
                (r.x1 + 110.0, r.vertical_center())
            } else {
                (r.x0 - 110.0, r.vertical_center())
            }
        }
        270 => {
            if record.is_left_half {
                (r.horizontal_center(), r.y1 + 90.0)
            } else {
                (r.horizontal_center(), r.y0 - 90.0)
            }
        }
        _ => return None,
    };
    Some(point)
}

/// Stamp every record's label into a copy of the drawing.
///
/// The document is serialized fully in memory before anything hits the
/// filesystem, so a failed run never leaves a partial output file.
pub fn write_annotations(
    input: &Path,
    output: &Path,
    records: &[LocatedCircuit],
) -> Result<(), WiremarkError> {
    let mut doc = Document::load(input)
        .map_err(|e| WiremarkError::Pdf(format!("failed to open {}: {e}", input.display())))?;
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    let mut by_page: BTreeMap<usize, Vec<&LocatedCircuit>> = BTreeMap::new();
    for record in records {
        by_page.entry(record.page_index).or_default().push(record);
    }

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    for (&page_index, page_records) in &by_page {
        let Some(&page_id) = page_ids.get(page_index) else {
            log::warn!("record references page {page_index} outside the document, skipped");
            continue;
        };

        let mut ops = Vec::new();
        for record in page_records {
            let Some(serial) = &record.serial else {
                continue;
            };
            let Some((x, y)) = annotation_point(record) else {
                log::warn!(
                    "page {page_index}: rotation {} has no offset rule, circuit {} left unannotated",
                    record.page_rotation,
                    record.circuit_number
                );
                continue;
            };
            label_ops(&mut ops, record.page_rotation, x, y, &serial.to_string());
        }
        if ops.is_empty() {
            continue;
        }

        register_label_font(&mut doc, page_id, font_id)?;
        let encoded = Content { operations: ops }
            .encode()
            .map_err(|e| WiremarkError::Pdf(format!("content encode failed: {e}")))?;
        doc.add_page_contents(page_id, encoded)
            .map_err(|e| WiremarkError::Pdf(format!("failed to extend page {page_index}: {e}")))?;
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| WiremarkError::Pdf(format!("failed to serialize output: {e}")))?;
    std::fs::write(output, buf)?;
    Ok(())
}

/// Text operators for one label: red fill, fixed size, text matrix rotated
/// by the page angle about the insertion point.
fn label_ops(ops: &mut Vec<Operation>, rotation: i32, x: f64, y: f64, text: &str) {
    let (cos, sin) = match rotation {
        90 => (0.0, 1.0),
        180 => (-1.0, 0.0),
        270 => (0.0, -1.0),
        _ => (1.0, 0.0),
    };
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(LABEL_FONT.into()), real(LABEL_FONT_SIZE)],
    ));
    ops.push(Operation::new("rg", vec![real(1.0), real(0.0), real(0.0)]));
    ops.push(Operation::new(
        "Tm",
        vec![real(cos), real(sin), real(-sin), real(cos), real(x), real(y)],
    ));
    ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

/// Make the label font reachable from a page, preserving whatever resources
/// the page already has (direct, referenced, or inherited).
fn register_label_font(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<(), WiremarkError> {
    let mut resources = match inherited_page_attr(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict,
        Some(_) => return Err(WiremarkError::Pdf("page resources are not a dictionary".into())),
        None => Dictionary::new(),
    };

    let mut fonts = match resources.get(b"Font").ok().cloned() {
        Some(Object::Dictionary(dict)) => dict,
        Some(Object::Reference(id)) => doc
            .get_object(id)
            .and_then(|o| o.as_dict())
            .map(|d| d.clone())
            .map_err(|e| WiremarkError::Pdf(format!("font resources unreadable: {e}")))?,
        Some(_) => return Err(WiremarkError::Pdf("page font resources are not a dictionary".into())),
        None => Dictionary::new(),
    };

    fonts.set(LABEL_FONT, font_id);
    resources.set("Font", Object::Dictionary(fonts));

    let page_dict = doc
        .get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(|e| WiremarkError::Pdf(format!("page dictionary missing: {e}")))?;
    page_dict.set("Resources", Object::Dictionary(resources));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;

    fn record(rotation: i32, is_left_half: bool) -> LocatedCircuit {
        LocatedCircuit {
            page_index: 0,
            circuit_number: "7".into(),
            match_text: "7/W0007,".into(),
            bounds: Rect::new(100.0, 200.0, 140.0, 210.0),
            page_rotation: rotation,
            is_left_half,
            page_width: 595.0,
            page_height: 842.0,
            part_numbers: vec![],
            serial: None,
        }
    }

    #[test]
    fn offsets_for_unrotated_pages() {
        assert_eq!(annotation_point(&record(0, true)), Some((10.0, 205.0)));
        assert_eq!(annotation_point(&record(0, false)), Some((230.0, 205.0)));
    }

    #[test]
    fn offsets_for_quarter_rotation() {
        assert_eq!(annotation_point(&record(90, true)), Some((170.0, 190.0)));
        assert_eq!(annotation_point(&record(90, false)), Some((170.0, 220.0)));
    }

    #[test]
    fn offsets_for_half_rotation() {
        assert_eq!(annotation_point(&record(180, true)), Some((250.0, 205.0)));
        assert_eq!(annotation_point(&record(180, false)), Some((-10.0, 205.0)));
    }

    #[test]
    fn offsets_for_three_quarter_rotation() {
        assert_eq!(annotation_point(&record(270, true)), Some((120.0, 300.0)));
        assert_eq!(annotation_point(&record(270, false)), Some((120.0, 110.0)));
    }

    #[test]
    fn unhandled_rotation_has_no_point() {
        assert_eq!(annotation_point(&record(45, true)), None);
        assert_eq!(annotation_point(&record(360, false)), None);
    }
}

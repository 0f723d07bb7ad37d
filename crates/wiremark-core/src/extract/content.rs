//! Positioned text extraction from PDF pages via lopdf.
//!
//! Walks each page's content stream with a minimal text-state machine and
//! yields one `TextRun` per text-showing operation. Run positions come from
//! the text matrix; widths are estimated downstream from the font size,
//! which is all the annotation offsets need.

use crate::error::WiremarkError;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;

/// One text-showing operation from a page content stream.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// Text and geometry read from a single page.
#[derive(Debug, Clone)]
pub struct PageText {
    /// Zero-based page number.
    pub index: usize,
    pub width: f64,
    pub height: f64,
    /// Page rotation in degrees, normalized to [0, 360).
    pub rotation: i32,
    pub runs: Vec<TextRun>,
}

impl PageText {
    /// Raw page text for pattern scanning: run texts joined with newlines.
    /// The joint-suppression pattern relies on these run boundaries.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Read every page of a loaded document, in page order.
pub fn read_pages(doc: &Document) -> Result<Vec<PageText>, WiremarkError> {
    let mut pages = Vec::new();
    for (index, (_, page_id)) in doc.get_pages().into_iter().enumerate() {
        let (width, height) = page_size(doc, page_id);
        pages.push(PageText {
            index,
            width,
            height,
            rotation: page_rotation(doc, page_id),
            runs: page_runs(doc, page_id)?,
        });
    }
    Ok(pages)
}

/// Look up a page attribute, following the Parent chain for inheritable
/// keys (MediaBox, Rotate, Resources). References are resolved.
pub(crate) fn inherited_page_attr(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<Object> {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let dict = doc.get_object(id).and_then(|o| o.as_dict()).ok()?;
        if let Ok(value) = dict.get(key) {
            let resolved = match value {
                Object::Reference(r) => doc.get_object(*r).ok()?,
                other => other,
            };
            return Some(resolved.clone());
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    None
}

fn page_size(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    if let Some(Object::Array(media_box)) = inherited_page_attr(doc, page_id, b"MediaBox") {
        if media_box.len() == 4 {
            if let (Some(llx), Some(lly), Some(urx), Some(ury)) = (
                number(&media_box[0]),
                number(&media_box[1]),
                number(&media_box[2]),
                number(&media_box[3]),
            ) {
                return (urx - llx, ury - lly);
            }
        }
    }
    // A4 fallback when page metadata is missing
    (595.0, 842.0)
}

fn page_rotation(doc: &Document, page_id: ObjectId) -> i32 {
    let degrees = inherited_page_attr(doc, page_id, b"Rotate")
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(0);
    (degrees.rem_euclid(360)) as i32
}

const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

struct TextState {
    text_matrix: [f64; 6],
    line_matrix: [f64; 6],
    font: Vec<u8>,
    size: f64,
    leading: f64,
    in_text: bool,
}

impl Default for TextState {
    fn default() -> Self {
        TextState {
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            font: Vec::new(),
            size: 12.0,
            leading: 0.0,
            in_text: false,
        }
    }
}

impl TextState {
    fn begin(&mut self) {
        self.in_text = true;
        self.text_matrix = IDENTITY;
        self.line_matrix = IDENTITY;
    }

    /// Td: translate the line matrix and restart the text matrix from it.
    fn move_line(&mut self, tx: f64, ty: f64) {
        let m = &mut self.line_matrix;
        m[4] += tx * m[0] + ty * m[2];
        m[5] += tx * m[1] + ty * m[3];
        self.text_matrix = *m;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn set_matrix(&mut self, m: [f64; 6]) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    fn origin(&self) -> (f64, f64) {
        (self.text_matrix[4], self.text_matrix[5])
    }
}

fn page_runs(doc: &Document, page_id: ObjectId) -> Result<Vec<TextRun>, WiremarkError> {
    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let data = doc
        .get_page_content(page_id)
        .map_err(|e| WiremarkError::Pdf(format!("unreadable page content: {e}")))?;
    let content =
        Content::decode(&data).map_err(|e| WiremarkError::Pdf(format!("undecodable content stream: {e}")))?;

    let mut runs = Vec::new();
    let mut state = TextState::default();

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => state.begin(),
            "ET" => state.in_text = false,
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Ok(name) = op.operands[0].as_name() {
                        state.font = name.to_vec();
                    }
                    if let Some(size) = number(&op.operands[1]) {
                        state.size = size;
                    }
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(number) {
                    state.leading = leading;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = number(&op.operands[0]).unwrap_or(0.0);
                    let ty = number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    let mut m = IDENTITY;
                    for (i, operand) in op.operands.iter().take(6).enumerate() {
                        m[i] = number(operand).unwrap_or(m[i]);
                    }
                    state.set_matrix(m);
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(text) = op
                    .operands
                    .first()
                    .and_then(|obj| decode_string(obj, doc, &fonts, &state.font))
                {
                    push_run(&mut runs, &state, text);
                }
            }
            "'" => {
                state.next_line();
                if let Some(text) = op
                    .operands
                    .first()
                    .and_then(|obj| decode_string(obj, doc, &fonts, &state.font))
                {
                    push_run(&mut runs, &state, text);
                }
            }
            "\"" => {
                state.next_line();
                if let Some(text) = op
                    .operands
                    .get(2)
                    .and_then(|obj| decode_string(obj, doc, &fonts, &state.font))
                {
                    push_run(&mut runs, &state, text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(parts)) = op.operands.first() {
                    let mut combined = String::new();
                    for part in parts {
                        if let Some(text) = decode_string(part, doc, &fonts, &state.font) {
                            combined.push_str(&text);
                        }
                    }
                    push_run(&mut runs, &state, combined);
                }
            }
            _ => {}
        }
    }

    Ok(runs)
}

fn push_run(runs: &mut Vec<TextRun>, state: &TextState, text: String) {
    if !state.in_text || text.trim().is_empty() {
        return;
    }
    let (x, y) = state.origin();
    runs.push(TextRun {
        text,
        x,
        y,
        font_size: state.size,
    });
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Decode a string operand through the current font's encoding, falling
/// back to UTF-16BE (BOM-marked) and then Latin-1.
fn decode_string(
    obj: &Object,
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    font: &[u8],
) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };

    if let Some(font_dict) = fonts.get(font) {
        if let Ok(encoding) = font_dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return Some(text);
            }
        }
    }

    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&utf16));
    }

    Some(bytes.iter().map(|&b| b as char).collect())
}

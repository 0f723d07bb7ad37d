pub mod content;
pub mod scan;

pub use content::{PageText, TextRun};

use crate::error::WiremarkError;
use crate::model::LocatedCircuit;
use lopdf::Document;
use std::path::Path;

/// Scan a drawing for circuit numbers.
///
/// Pass 1 collects circuit numbers fed into joint splices; those are
/// suppressed across the whole document. Pass 2 finds the standalone
/// occurrences to be labeled, with page geometry attached.
pub fn extract_circuits(pdf_path: &Path) -> Result<Vec<LocatedCircuit>, WiremarkError> {
    let doc = Document::load(pdf_path)
        .map_err(|e| WiremarkError::Pdf(format!("failed to open {}: {e}", pdf_path.display())))?;
    let pages = content::read_pages(&doc)?;
    Ok(scan::scan_pages(&pages))
}

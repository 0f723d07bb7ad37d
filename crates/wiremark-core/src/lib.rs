pub mod annotate;
pub mod error;
pub mod extract;
pub mod matching;
pub mod model;

pub use error::WiremarkError;
pub use model::{LocatedCircuit, Rect, SerialValue};

use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CIRCUIT_COLUMN: &str = "Wire Internal Name";
pub const DEFAULT_SERIAL_COLUMN: &str = "SN FILS SIMPLE";
/// Appended to the input file stem when no output path is given.
pub const OUTPUT_SUFFIX: &str = "_annotated";

/// Line-oriented progress reporting for the presentation layer.
pub trait ProgressSink {
    fn line(&mut self, message: &str);
}

/// Discards progress messages.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn line(&mut self, _message: &str) {}
}

/// Parameters for one end-to-end annotation run.
#[derive(Debug, Clone)]
pub struct StampRequest {
    pub pdf_path: PathBuf,
    pub workbook_path: PathBuf,
    /// `None` means the workbook's first sheet.
    pub sheet_name: Option<String>,
    /// `None` means the input name with [`OUTPUT_SUFFIX`].
    pub output_path: Option<PathBuf>,
    pub circuit_column: String,
    pub serial_column: String,
}

impl StampRequest {
    pub fn new(pdf_path: impl Into<PathBuf>, workbook_path: impl Into<PathBuf>) -> StampRequest {
        StampRequest {
            pdf_path: pdf_path.into(),
            workbook_path: workbook_path.into(),
            sheet_name: None,
            output_path: None,
            circuit_column: DEFAULT_CIRCUIT_COLUMN.to_string(),
            serial_column: DEFAULT_SERIAL_COLUMN.to_string(),
        }
    }

    /// The explicit output path, or the default convention. Never the input
    /// file itself.
    pub fn resolved_output_path(&self) -> PathBuf {
        match &self.output_path {
            Some(path) => path.clone(),
            None => default_output_path(&self.pdf_path),
        }
    }
}

/// Default output convention: the input name with a fixed suffix before the
/// extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}.pdf"))
}

/// Counts reported after a run.
#[derive(Debug, Clone, Serialize)]
pub struct StampSummary {
    pub circuits_found: usize,
    pub resolved: usize,
    pub not_found: usize,
    pub format_errors: usize,
    /// Records on pages whose rotation has no offset rule; present in the
    /// output data but carrying no label.
    pub skipped_rotation: usize,
    pub output_path: PathBuf,
}

/// Run the full pipeline: extract circuit numbers, resolve their serial
/// numbers, write the annotated copy.
///
/// Blocking and strictly sequential; each stage completes before the next
/// starts. Callers wanting a responsive UI run the whole call on their own
/// background context.
pub fn stamp_pdf(
    request: &StampRequest,
    progress: &mut dyn ProgressSink,
) -> Result<StampSummary, WiremarkError> {
    progress.line(&format!(
        "Extracting circuit numbers from {}...",
        request.pdf_path.display()
    ));
    let mut records = extract::extract_circuits(&request.pdf_path)?;
    progress.line(&format!("{} circuit number(s) found.", records.len()));

    progress.line(&format!(
        "Looking up serial numbers in {}...",
        request.workbook_path.display()
    ));
    let table = matching::ReferenceTable::load(
        &request.workbook_path,
        request.sheet_name.as_deref(),
        &request.circuit_column,
        &request.serial_column,
    )?;
    matching::resolve_serials(&mut records, &table);

    progress.line("Adding annotations to the PDF...");
    let output_path = request.resolved_output_path();
    annotate::write_annotations(&request.pdf_path, &output_path, &records)?;
    progress.line(&format!("Result saved to {}.", output_path.display()));

    let mut summary = StampSummary {
        circuits_found: records.len(),
        resolved: 0,
        not_found: 0,
        format_errors: 0,
        skipped_rotation: 0,
        output_path,
    };
    for record in &records {
        match record.serial {
            Some(SerialValue::Resolved { .. }) => summary.resolved += 1,
            Some(SerialValue::NotFound) => summary.not_found += 1,
            Some(SerialValue::FormatError) => summary.format_errors += 1,
            None => {}
        }
        if annotate::annotation_point(record).is_none() {
            summary.skipped_rotation += 1;
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_keeps_directory_and_appends_suffix() {
        let out = default_output_path(Path::new("/data/drawings/harness.pdf"));
        assert_eq!(out, PathBuf::from("/data/drawings/harness_annotated.pdf"));
    }

    #[test]
    fn explicit_output_path_wins() {
        let mut request = StampRequest::new("in.pdf", "table.xlsx");
        assert_eq!(request.resolved_output_path(), PathBuf::from("in_annotated.pdf"));
        request.output_path = Some(PathBuf::from("elsewhere.pdf"));
        assert_eq!(request.resolved_output_path(), PathBuf::from("elsewhere.pdf"));
    }

    #[test]
    fn request_defaults_use_the_documented_columns() {
        let request = StampRequest::new("in.pdf", "table.xlsx");
        assert_eq!(request.circuit_column, "Wire Internal Name");
        assert_eq!(request.serial_column, "SN FILS SIMPLE");
        assert!(request.sheet_name.is_none());
    }
}

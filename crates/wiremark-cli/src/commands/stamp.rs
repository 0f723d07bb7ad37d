use std::path::PathBuf;
use wiremark_core::error::WiremarkError;
use wiremark_core::{ProgressSink, StampRequest};

use crate::output;

/// Prints pipeline progress to stderr, keeping stdout for the summary.
struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn line(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

pub fn run(
    pdf_file: PathBuf,
    workbook_file: PathBuf,
    sheet: Option<String>,
    out: Option<PathBuf>,
    circuit_column: String,
    serial_column: String,
    output_format: &str,
) -> Result<(), WiremarkError> {
    let request = StampRequest {
        pdf_path: pdf_file,
        workbook_path: workbook_file,
        sheet_name: sheet,
        output_path: out,
        circuit_column,
        serial_column,
    };

    let summary = wiremark_core::stamp_pdf(&request, &mut StderrProgress)?;

    match output_format {
        "json" => output::json::print_summary(&summary)?,
        _ => output::table::print_summary(&summary),
    }

    Ok(())
}

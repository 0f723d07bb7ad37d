use std::path::PathBuf;
use wiremark_core::error::WiremarkError;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), WiremarkError> {
    let records = wiremark_core::extract::extract_circuits(&pdf_file)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&records)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "{} circuit number(s) found, written to {}",
                records.len(),
                path.display()
            );
        }
        None => match output_format {
            "json" => println!("{}", serde_json::to_string_pretty(&records)?),
            _ => output::table::print_records(&records),
        },
    }

    Ok(())
}

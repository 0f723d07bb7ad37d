use std::path::PathBuf;
use wiremark_core::error::WiremarkError;
use wiremark_core::matching::table::sheet_names;

pub fn run(workbook_file: PathBuf) -> Result<(), WiremarkError> {
    let names = sheet_names(&workbook_file)?;
    if names.is_empty() {
        return Err(WiremarkError::EmptyWorkbook);
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

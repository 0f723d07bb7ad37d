use wiremark_core::{LocatedCircuit, StampSummary};

pub fn print_summary(summary: &StampSummary) {
    println!("Circuits found:   {}", summary.circuits_found);
    println!("Serials resolved: {}", summary.resolved);
    if summary.not_found > 0 {
        println!("Not found:        {}", summary.not_found);
    }
    if summary.format_errors > 0 {
        println!("Format errors:    {}", summary.format_errors);
    }
    if summary.skipped_rotation > 0 {
        println!("Skipped (unhandled rotation): {}", summary.skipped_rotation);
    }
    println!("Output: {}", summary.output_path.display());
}

pub fn print_records(records: &[LocatedCircuit]) {
    if records.is_empty() {
        println!("No circuit numbers found.");
        return;
    }

    let match_width = records
        .iter()
        .map(|r| r.match_text.len())
        .max()
        .unwrap_or(10)
        .max("MATCH".len());

    println!(
        "{:<5} {:<8} {:<match_width$} {:<5} SERIAL",
        "PAGE", "CIRCUIT", "MATCH", "SIDE"
    );
    for record in records {
        let side = if record.is_left_half { "left" } else { "right" };
        let serial = record
            .serial
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<5} {:<8} {:<match_width$} {:<5} {}",
            record.page_index, record.circuit_number, record.match_text, side, serial
        );
    }
}

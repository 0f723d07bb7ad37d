use wiremark_core::error::WiremarkError;
use wiremark_core::StampSummary;

pub fn print_summary(summary: &StampSummary) -> Result<(), WiremarkError> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{json}");
    Ok(())
}

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "wiremark",
    version,
    about = "Annotate wiring-diagram PDFs with serial numbers from a spreadsheet"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract circuits, look up serial numbers, write the annotated PDF
    Stamp {
        /// Wiring-diagram PDF to annotate
        pdf_file: PathBuf,

        /// Workbook holding the serial-number table
        workbook_file: PathBuf,

        /// Sheet name (defaults to the workbook's first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Output PDF path (defaults to the input name with a suffix)
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Column holding circuit numbers
        #[arg(long, default_value = wiremark_core::DEFAULT_CIRCUIT_COLUMN)]
        circuit_column: String,

        /// Column holding serial numbers
        #[arg(long, default_value = wiremark_core::DEFAULT_SERIAL_COLUMN)]
        serial_column: String,

        /// Output format: table (default) or json
        #[arg(short = 'o', long, default_value = "table")]
        output: String,
    },
    /// Extract circuit numbers from a PDF without annotating
    Extract {
        /// Wiring-diagram PDF to scan
        pdf_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short = 'o', long, default_value = "table")]
        output: String,

        /// Write extracted records to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// List the sheet names of a workbook
    Sheets {
        /// Workbook file
        workbook_file: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Stamp {
            pdf_file,
            workbook_file,
            sheet,
            out,
            circuit_column,
            serial_column,
            output,
        } => commands::stamp::run(
            pdf_file,
            workbook_file,
            sheet,
            out,
            circuit_column,
            serial_column,
            &output,
        ),
        Commands::Extract {
            pdf_file,
            output,
            out,
        } => commands::extract::run(pdf_file, &output, out),
        Commands::Sheets { workbook_file } => commands::sheets::run(workbook_file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use sheetpolish::{cli, logging};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "Usage: sheetpolish <excel_file>";

#[derive(Parser)]
#[command(name = "sheetpolish")]
#[command(about = "Reformat a spreadsheet workbook for readability")]
#[command(long_about = "Reformat a spreadsheet workbook for readability.

Writes processed_<name> next to the input, one sheet per input sheet:

  Two-column sheets    Headers become Field / Value, blank rows removed
  Other sheets         Blank rows and columns removed, all-date text columns
                       rewritten as YYYY-MM-DD, numbers rounded to 2 places

Every column is sized to its widest value.

EXAMPLE:
  sheetpolish report.xlsx     # writes processed_report.xlsx

Logs go to stderr; use -v, -vv, -vvv or RUST_LOG to see them.")]
#[command(version)]
struct Cli {
    /// Path to the workbook (.xlsx, .xlsm, .xlsb, .xls, .ods)
    #[arg(value_name = "excel_file")]
    files: Vec<PathBuf>,

    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            println!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    let [input] = cli.files.as_slice() else {
        println!("{}", USAGE);
        return ExitCode::FAILURE;
    };

    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("warning: logging disabled: {}", e);
    }

    match cli::process(input) {
        Ok(report) => {
            println!("Processed file saved as: {}", report.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Error processing file: {}", e);
            ExitCode::FAILURE
        }
    }
}

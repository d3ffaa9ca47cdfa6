//! CLI tool to select columns and filter rows of a CSV file.
//!
//! Usage:
//!   csv-process data.csv -c col1,col3 -f 'col1>l1c1' -f 'col3>l1c3'
//!   csv-process - -F filters.txt < data.csv
//!
//! Set `RUST_LOG=debug` for diagnostics on stderr.

use clap::Parser;
use csv_processor::{
    ProcessError, ProcessOutput, ProcessResult, process_file_text, process_text,
};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;

/// Select columns and filter rows of a CSV file.
///
/// Filters on the same column are OR-ed; filters on different columns are
/// AND-ed. All comparisons are lexicographic.
#[derive(Parser)]
#[command(name = "csv-process")]
struct Cli {
    /// CSV file to read, or - for stdin
    input: String,

    /// Comma-separated columns to keep (default: all)
    #[arg(short, long, default_value = "")]
    columns: String,

    /// Filter expression such as col1>5 (repeatable)
    #[arg(short, long = "filter", value_name = "EXPR")]
    filters: Vec<String>,

    /// File with one filter expression per line
    #[arg(short = 'F', long, value_name = "PATH")]
    filter_file: Option<String>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Show record counts on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn read_stdin() -> io::Result<String> {
    let mut bytes = Vec::new();
    io::stdin().read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn run(cli: &Cli, filters: &str) -> ProcessResult<ProcessOutput> {
    if cli.input == "-" {
        let csv = read_stdin().map_err(|source| ProcessError::FileOpen {
            path: "-".into(),
            source,
        })?;
        process_text(&csv, &cli.columns, filters)
    } else {
        process_file_text(&cli.input, &cli.columns, filters)
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut filter_lines = cli.filters.clone();
    if let Some(path) = &cli.filter_file {
        match fs::read_to_string(path) {
            Ok(content) => filter_lines.extend(content.lines().map(str::to_string)),
            Err(e) => {
                eprintln!("Error reading filter file '{path}': {e}");
                process::exit(1);
            }
        }
    }
    let filters = filter_lines.join("\n");

    let output = match run(&cli, &filters) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Some(out_path) = &cli.output {
        if let Some(parent) = Path::new(out_path.as_str()).parent()
            && !parent.as_os_str().is_empty()
            && fs::create_dir_all(parent).is_err()
        {
            eprintln!("Error creating output directory for '{out_path}'");
            process::exit(1);
        }
        if let Err(e) = fs::write(out_path, &output.text) {
            eprintln!("Error writing output file '{out_path}': {e}");
            process::exit(1);
        }
    } else if let Err(e) = io::stdout().write_all(output.text.as_bytes()) {
        eprintln!("Error writing output: {e}");
        process::exit(1);
    }

    if cli.verbose {
        eprintln!(
            "Rows:     {} in -> {} out",
            output.rows_read, output.rows_written
        );
    }
}

//! Pipeline driver and entry points.
//!
//! Order of work for one call:
//! 1. split off the header
//! 2. build the selection plan
//! 3. parse the filters against the full header
//! 4. push every data row through the filter and projection stages
//! 5. assemble the header line and the accepted rows into one buffer
//!
//! Output is assembled in full before anything is written, so a failing call
//! never leaves partial output behind.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::{debug, error};

use crate::error::{ProcessError, ProcessResult};
use crate::executor::execute_rows;
use crate::filter::parse_filters;
use crate::record::{CsvText, LINE_DELIMITER};
use crate::select::select_columns;
use crate::stage::build_stages;

/// Result of one successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Header line followed by every accepted row, each ending in `\n`.
    pub text: String,
    /// Data rows read (header excluded).
    pub rows_read: usize,
    /// Data rows written (header excluded).
    pub rows_written: usize,
}

/// Select and filter in-memory CSV text.
///
/// `selected` is a comma-separated list of column names (empty for all),
/// `filters` holds one filter expression per line.
pub fn process_text(csv: &str, selected: &str, filters: &str) -> ProcessResult<ProcessOutput> {
    let csv = CsvText::parse(csv);
    let header = csv.header();

    let plan = select_columns(header, selected)?;
    let filters = parse_filters(header, filters)?;

    let mut text = plan.header_line();
    text.push(LINE_DELIMITER);

    let stages = build_stages(filters, plan);
    let (rows, rows_read) = execute_rows(csv.rows(), &stages)?;

    for row in &rows {
        text.push_str(&row.to_line());
        text.push(LINE_DELIMITER);
    }

    debug!("Processed {} -> {} rows", rows_read, rows.len());
    Ok(ProcessOutput {
        text,
        rows_read,
        rows_written: rows.len(),
    })
}

/// Read the CSV file at `path` and delegate to [`process_text`].
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
/// rejected.
pub fn process_file_text(
    path: impl AsRef<Path>,
    selected: &str,
    filters: &str,
) -> ProcessResult<ProcessOutput> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| ProcessError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    process_text(&String::from_utf8_lossy(&bytes), selected, filters)
}

/// Write a result to one of two sinks: the output text to `out`, or a single
/// diagnostic line to `err`. Returns whether the call succeeded.
fn report<O, E>(result: ProcessResult<ProcessOutput>, out: &mut O, err: &mut E) -> bool
where
    O: Write,
    E: Write,
{
    match result {
        Ok(output) => {
            if let Err(e) = out.write_all(output.text.as_bytes()).and_then(|_| out.flush()) {
                error!("Failed to write output: {e}");
                let _ = writeln!(err, "Error writing output: {e}");
                return false;
            }
            true
        }
        Err(e) => {
            if let ProcessError::FileOpen { path, source } = &e {
                debug!("Cannot read {}: {source}", path.display());
            }
            // Nothing else to report to if stderr itself is gone.
            let _ = writeln!(err, "{e}");
            false
        }
    }
}

/// [`process_text`], writing the result to `out` or the diagnostic to `err`.
pub fn process_to<O, E>(csv: &str, selected: &str, filters: &str, out: &mut O, err: &mut E) -> bool
where
    O: Write,
    E: Write,
{
    report(process_text(csv, selected, filters), out, err)
}

/// [`process_file_text`], writing the result to `out` or the diagnostic to
/// `err`.
pub fn process_file_to<O, E>(
    path: impl AsRef<Path>,
    selected: &str,
    filters: &str,
    out: &mut O,
    err: &mut E,
) -> bool
where
    O: Write,
    E: Write,
{
    report(process_file_text(path, selected, filters), out, err)
}

/// Process in-memory CSV text, printing the result to stdout or a single
/// diagnostic line to stderr.
pub fn process(csv: &str, selected: &str, filters: &str) {
    process_to(
        csv,
        selected,
        filters,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );
}

/// Process a CSV file, printing the result to stdout or a single diagnostic
/// line to stderr.
pub fn process_file(path: impl AsRef<Path>, selected: &str, filters: &str) {
    process_file_to(
        path,
        selected,
        filters,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "header1,header2,header3\n1,2,3\n4,5,6\n7,8,9";

    fn run(csv: &str, selected: &str, filters: &str) -> (String, String, bool) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let ok = process_to(csv, selected, filters, &mut out, &mut err);
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
            ok,
        )
    }

    #[test]
    fn test_all_columns_when_selection_empty() {
        let output = process_text(CSV, "", "header1>1\nheader3<8").unwrap();
        assert_eq!(output.text, "header1,header2,header3\n4,5,6\n");
        assert_eq!(output.rows_read, 3);
        assert_eq!(output.rows_written, 1);
    }

    #[test]
    fn test_filter_on_unselected_column() {
        let output = process_text(CSV, "header1,header3", "header1=4\nheader2>3").unwrap();
        assert_eq!(output.text, "header1,header3\n4,6\n");
    }

    #[test]
    fn test_selection_follows_header_order() {
        let output = process_text(CSV, "header3,header1", "header1=4\nheader2>3").unwrap();
        assert_eq!(output.text, "header1,header3\n4,6\n");
    }

    #[test]
    fn test_no_rows_accepted_still_prints_header() {
        let csv = "header1,header2,header3,header4\n1,2,3,4\n5,6,7,8\n9,10,11,12";
        let output = process_text(csv, "header1,header3,header4", "header1>1\nheader3<10").unwrap();
        assert_eq!(output.text, "header1,header3,header4\n");
        assert_eq!(output.rows_written, 0);
    }

    #[test]
    fn test_output_to_writer() {
        let (out, err, ok) = run(CSV, "", "header1=4\nheader1=7\nheader2>3\nheader3>4");
        assert!(ok);
        assert_eq!(out, "header1,header2,header3\n4,5,6\n7,8,9\n");
        assert!(err.is_empty());
    }

    #[test]
    fn test_unknown_selected_column_writes_only_diagnostic() {
        let (out, err, ok) = run(CSV, "header1,header2,header4", "header2>3\nheader1=4");
        assert!(!ok);
        assert!(out.is_empty());
        assert_eq!(err, "Header 'header4' not found in CSV file/string\n");
    }

    #[test]
    fn test_selection_checked_before_filters() {
        let (_, err, _) = run(CSV, "nope", "");
        assert_eq!(err, "Header 'nope' not found in CSV file/string\n");
    }

    #[test]
    fn test_empty_filters_write_only_diagnostic() {
        let (out, err, ok) = run(CSV, "header1,header3", "");
        assert!(!ok);
        assert!(out.is_empty());
        assert_eq!(
            err,
            "Invalid filter: There is no filter, rowFilterDefinitions is empty\n"
        );
    }

    #[test]
    fn test_row_shape_discards_partial_output() {
        let csv = "a,b\n1,2\n3\n5,6";
        let (out, err, ok) = run(csv, "", "b>0");
        assert!(!ok);
        assert!(out.is_empty());
        assert_eq!(err.lines().count(), 1);
        assert!(err.starts_with("Row 3 "));
    }

    #[test]
    fn test_missing_file_diagnostic() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let ok = process_file_to(
            "/nonexistent/dir/data.csv",
            "",
            "a=1",
            &mut out,
            &mut err,
        );
        assert!(!ok);
        assert!(out.is_empty());
        assert_eq!(String::from_utf8(err).unwrap(), "Error opening CSV file\n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_output_write_failure_reports_one_line() {
        let mut err = Vec::new();
        let ok = process_to(CSV, "", "header1>1", &mut BrokenPipe, &mut err);
        assert!(!ok);
        let err = String::from_utf8(err).unwrap();
        assert_eq!(err, "Error writing output: closed\n");
    }

    #[test]
    fn test_trailing_comma_in_selection() {
        let output = process_text("h1,h2\n1,2\n3,4", "h1,", "h1>1").unwrap();
        assert_eq!(output.text, "h1\n3\n");
    }

    #[test]
    fn test_trailing_commas_in_rows() {
        let output = process_text("h1,h2,\n1,2,\n3,4,", "", "h1>1").unwrap();
        assert_eq!(output.text, "h1,h2\n3,4\n");
    }

    #[test]
    fn test_empty_row_is_out_of_bounds() {
        match process_text("h1\n1\n\n3", "", "h1<z") {
            Err(ProcessError::RowShape {
                line,
                index,
                fields,
            }) => {
                assert_eq!(line, 3);
                assert_eq!(index, 0);
                assert_eq!(fields, 0);
            }
            other => panic!("Expected RowShape, got {other:?}"),
        }
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let first = process_text(CSV, "header2", "header1!=1").unwrap();
        let second = process_text(CSV, "header2", "header1!=1").unwrap();
        assert_eq!(first, second);
    }
}

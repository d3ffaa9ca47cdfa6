//! Error type shared by every stage of CSV processing.
//!
//! Every failure is fatal to the current call. The `Display` output of each
//! variant is the exact diagnostic line written to stderr by the entry points.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while selecting and filtering CSV text.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The filter-definition block was empty.
    #[error("Invalid filter: There is no filter, rowFilterDefinitions is empty")]
    EmptyFilter,

    /// A filter line did not have the `<column><comparator><value>` shape.
    #[error("Invalid filter: '{0}'")]
    MalformedFilter(String),

    /// A column named in the selection or in a filter is not in the header.
    #[error("Header '{0}' not found in CSV file/string")]
    UnknownColumn(String),

    /// The CSV file could not be read.
    #[error("Error opening CSV file")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A data row is too short for a referenced column.
    #[error("Row {line} has {fields} field(s), column index {index} is out of bounds")]
    RowShape {
        /// 1-based line number in the CSV text (the header is line 1).
        line: usize,
        index: usize,
        fields: usize,
    },
}

/// Result type for processing operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

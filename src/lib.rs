//! # csv-processor-rs
//!
//! Select columns and filter rows of simple comma-separated text.
//!
//! ## Overview
//!
//! - **Plain splitting**: lines on `\n`, fields on `,`, no quoting rules
//! - **Column selection**: a comma-separated list of header names, emitted
//!   in header order
//! - **Row filters**: one `<column><comparator><value>` expression per line,
//!   compared lexicographically
//! - **Filter groups**: filters on one column are OR-ed, columns are AND-ed
//!
//! ## Example
//!
//! ```
//! use csv_processor::process_text;
//!
//! let csv = "header1,header2,header3\n1,2,3\n4,5,6\n7,8,9";
//!
//! let output = process_text(csv, "header3,header1", "header1=4\nheader1=7\nheader2>3").unwrap();
//!
//! assert_eq!(output.text, "header1,header3\n4,6\n7,9\n");
//! assert_eq!(output.rows_written, 2);
//! ```

pub mod error;
pub mod executor;
pub mod ffi;
pub mod filter;
pub mod processor;
pub mod record;
pub mod select;
pub mod stage;

pub use error::{ProcessError, ProcessResult};
pub use executor::execute_rows;
pub use filter::{Comparator, Filter, FilterSet, parse_filter, parse_filters};
pub use processor::{
    ProcessOutput, process, process_file, process_file_text, process_file_to, process_text,
    process_to,
};
pub use record::{CsvText, Row, split_fields};
pub use select::{HeaderColumn, SelectionPlan, select_columns};
pub use stage::{FilterStage, ProjectStage, RowStage, build_stages};

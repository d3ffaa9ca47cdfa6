//! C ABI.
//!
//! ```c
//! void processCsv(const char* csv, const char* selectedColumns, const char* rowFilterDefinitions);
//! void processCsvFile(const char* csvFilePath, const char* selectedColumns, const char* rowFilterDefinitions);
//! ```
//!
//! Both print to stdout on success or one diagnostic line to stderr on
//! failure. A null pointer reads as an empty string and invalid UTF-8 is
//! replaced lossily. Panics never cross the boundary.

use std::borrow::Cow;
use std::ffi::{CStr, c_char};
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};

use log::error;

use crate::processor::{process_file_to, process_to};

/// Borrow a C string as text.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for `'a`.
unsafe fn c_str<'a>(ptr: *const c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        return Cow::Borrowed("");
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy()
}

/// Run `f`, turning a panic into a failed call.
fn guard(f: impl FnOnce() -> bool) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(ok) => ok,
        Err(_) => {
            error!("panic while processing CSV");
            false
        }
    }
}

/// # Safety
///
/// Each pointer must be null or a valid NUL-terminated string.
unsafe fn csv_to<O: Write, E: Write>(
    csv: *const c_char,
    selected_columns: *const c_char,
    row_filter_definitions: *const c_char,
    out: &mut O,
    err: &mut E,
) -> bool {
    // SAFETY: forwarded from this function's contract.
    let (csv, selected, filters) = unsafe {
        (
            c_str(csv),
            c_str(selected_columns),
            c_str(row_filter_definitions),
        )
    };
    guard(|| process_to(&csv, &selected, &filters, out, err))
}

/// # Safety
///
/// Each pointer must be null or a valid NUL-terminated string.
unsafe fn csv_file_to<O: Write, E: Write>(
    csv_file_path: *const c_char,
    selected_columns: *const c_char,
    row_filter_definitions: *const c_char,
    out: &mut O,
    err: &mut E,
) -> bool {
    // SAFETY: forwarded from this function's contract.
    let (path, selected, filters) = unsafe {
        (
            c_str(csv_file_path),
            c_str(selected_columns),
            c_str(row_filter_definitions),
        )
    };
    guard(|| process_file_to(&*path, &selected, &filters, out, err))
}

/// Process in-memory CSV text.
///
/// # Safety
///
/// Each argument must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn processCsv(
    csv: *const c_char,
    selected_columns: *const c_char,
    row_filter_definitions: *const c_char,
) {
    // SAFETY: forwarded from this function's contract.
    unsafe {
        csv_to(
            csv,
            selected_columns,
            row_filter_definitions,
            &mut io::stdout().lock(),
            &mut io::stderr().lock(),
        );
    }
}

/// Process the CSV file at `csv_file_path`.
///
/// # Safety
///
/// Each argument must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn processCsvFile(
    csv_file_path: *const c_char,
    selected_columns: *const c_char,
    row_filter_definitions: *const c_char,
) {
    // SAFETY: forwarded from this function's contract.
    unsafe {
        csv_file_to(
            csv_file_path,
            selected_columns,
            row_filter_definitions,
            &mut io::stdout().lock(),
            &mut io::stderr().lock(),
        );
    }
}

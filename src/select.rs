//! Column selection.
//!
//! Resolves a comma-separated list of column names into a [`SelectionPlan`].
//! The plan is always in header order, whatever order the names were given
//! in, and names listed twice are emitted once.

use log::debug;

use crate::error::{ProcessError, ProcessResult};
use crate::record::{Row, split_fields};

/// A header column and its position in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumn {
    pub name: String,
    pub index: usize,
}

impl HeaderColumn {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// Columns to emit, sorted by header position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPlan {
    columns: Vec<HeaderColumn>,
}

impl SelectionPlan {
    /// Every header column, in header order.
    pub fn all(header: &[String]) -> Self {
        let columns = header
            .iter()
            .enumerate()
            .map(|(index, name)| HeaderColumn::new(name.as_str(), index))
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[HeaderColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Output header line (no terminator).
    pub fn header_line(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Pick the planned fields out of `row`, in plan order.
    pub fn project(&self, row: &Row) -> ProcessResult<Row> {
        let fields = self
            .columns
            .iter()
            .map(|c| {
                row.get(c.index)
                    .map(str::to_string)
                    .ok_or_else(|| ProcessError::RowShape {
                        line: row.line(),
                        index: c.index,
                        fields: row.len(),
                    })
            })
            .collect::<ProcessResult<Vec<_>>>()?;
        Ok(Row::from_fields(row.line(), fields))
    }
}

/// Build the selection plan for `selected` (comma-separated names) over
/// `header`.
///
/// An empty `selected` means every column. Names are split like a CSV line,
/// so a trailing comma adds no name. Any name missing from the header
/// aborts the whole selection. When the header repeats a name, its first
/// position is used.
pub fn select_columns(header: &[String], selected: &str) -> ProcessResult<SelectionPlan> {
    if selected.is_empty() {
        return Ok(SelectionPlan::all(header));
    }

    let mut columns: Vec<HeaderColumn> = Vec::new();
    for name in split_fields(selected) {
        let index = header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| ProcessError::UnknownColumn(name.clone()))?;
        if !columns.iter().any(|c| c.name == name) {
            columns.push(HeaderColumn::new(name, index));
        }
    }
    columns.sort_by_key(|c| c.index);

    debug!(
        "Selected {} of {} column(s): {:?}",
        columns.len(),
        header.len(),
        columns.iter().map(|c| c.index).collect::<Vec<_>>()
    );
    Ok(SelectionPlan { columns })
}

//! Row filter parser and evaluator.
//!
//! Filter format, one expression per line:
//! ```text
//! header1>1
//! header3<8
//! header1!=4
//! ```
//!
//! Each line is `<column><comparator><value>` where the comparator is one of
//! `>`, `<`, `=`, `!=`, `>=`, `<=`. Neither the column name nor the value may
//! contain `<`, `>`, `=` or `!`. Nothing is trimmed: `a = 1` filters column
//! `"a "` against value `" 1"`.
//!
//! Evaluation:
//! - Values compare byte-wise lexicographically, so `"10" < "9"`.
//! - Filters on the same column are OR-ed.
//! - Groups of different columns are AND-ed.

use std::cmp::Ordering;
use std::fmt;

use log::debug;

use crate::error::{ProcessError, ProcessResult};
use crate::record::{LINE_DELIMITER, Row};

/// Comparison operator of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Gt,
    Lt,
    Eq,
    Ne,
    Ge,
    Le,
}

impl Comparator {
    /// Parse an operator from its textual form.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Comparator::Gt),
            "<" => Some(Comparator::Lt),
            "=" => Some(Comparator::Eq),
            "!=" => Some(Comparator::Ne),
            ">=" => Some(Comparator::Ge),
            "<=" => Some(Comparator::Le),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
        }
    }

    /// Does a three-way comparison result satisfy this operator?
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Comparator::Gt => ordering == Ordering::Greater,
            Comparator::Lt => ordering == Ordering::Less,
            Comparator::Eq => ordering == Ordering::Equal,
            Comparator::Ne => ordering != Ordering::Equal,
            Comparator::Ge => ordering != Ordering::Less,
            Comparator::Le => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single filter bound to a header position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column_index: usize,
    pub comparator: Comparator,
    pub value: String,
}

impl Filter {
    pub fn new(column_index: usize, comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            column_index,
            comparator,
            value: value.into(),
        }
    }

    /// Compare `field` against the filter value.
    pub fn accepts(&self, field: &str) -> bool {
        self.comparator.accepts(field.cmp(self.value.as_str()))
    }
}

/// Filters on one column; satisfied when any member is.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterGroup {
    column_index: usize,
    members: Vec<usize>,
}

/// All filters of one call, grouped by column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    filters: Vec<Filter>,
    groups: Vec<FilterGroup>,
    max_column: Option<usize>,
}

impl FilterSet {
    /// Group filters by column, keeping groups in order of first appearance.
    pub fn new(filters: Vec<Filter>) -> Self {
        let mut groups: Vec<FilterGroup> = Vec::new();
        for (i, filter) in filters.iter().enumerate() {
            match groups
                .iter_mut()
                .find(|g| g.column_index == filter.column_index)
            {
                Some(group) => group.members.push(i),
                None => groups.push(FilterGroup {
                    column_index: filter.column_index,
                    members: vec![i],
                }),
            }
        }
        let max_column = filters.iter().map(|f| f.column_index).max();

        Self {
            filters,
            groups,
            max_column,
        }
    }

    /// Filters in input order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Number of distinct filtered columns.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Decide whether `row` passes: every column group must have at least one
    /// satisfied filter.
    ///
    /// Fails with [`ProcessError::RowShape`] when the row is too short for any
    /// filtered column, whether or not an earlier group already rejected it.
    pub fn matches(&self, row: &Row) -> ProcessResult<bool> {
        if let Some(max) = self.max_column
            && max >= row.len()
        {
            return Err(ProcessError::RowShape {
                line: row.line(),
                index: max,
                fields: row.len(),
            });
        }

        for group in &self.groups {
            let field = row.fields()[group.column_index].as_str();
            let satisfied = group
                .members
                .iter()
                .any(|&i| self.filters[i].accepts(field));
            if !satisfied {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn is_comparator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!')
}

/// Split a filter line into (column, comparator, value).
///
/// Single pass: a non-empty run without comparator characters, a run of one
/// or two comparator characters, then a non-empty run without comparator
/// characters up to the end of the line.
fn scan_line(line: &str) -> Option<(&str, &str, &str)> {
    let left_end = line.find(is_comparator_char)?;
    if left_end == 0 {
        return None;
    }

    let rest = &line[left_end..];
    let op_len = rest
        .find(|c: char| !is_comparator_char(c))
        .unwrap_or(rest.len());
    if op_len > 2 {
        return None;
    }

    let value = &rest[op_len..];
    if value.is_empty() || value.contains(is_comparator_char) {
        return None;
    }

    Some((&line[..left_end], &rest[..op_len], value))
}

/// Parse one filter line and resolve its column against `header`.
pub fn parse_filter(header: &[String], line: &str) -> ProcessResult<Filter> {
    let malformed = || ProcessError::MalformedFilter(line.to_string());

    let (column, symbol, value) = scan_line(line).ok_or_else(malformed)?;
    let comparator = Comparator::from_symbol(symbol).ok_or_else(malformed)?;

    let column_index = header
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| ProcessError::UnknownColumn(column.to_string()))?;

    Ok(Filter::new(column_index, comparator, value))
}

/// Parse a filter-definition block (one filter per line) against `header`.
///
/// An empty block is an error, not "no filtering". A single trailing line
/// break is allowed; any other empty line is malformed.
pub fn parse_filters(header: &[String], text: &str) -> ProcessResult<FilterSet> {
    if text.is_empty() {
        return Err(ProcessError::EmptyFilter);
    }

    let body = text.strip_suffix(LINE_DELIMITER).unwrap_or(text);
    let filters = body
        .split(LINE_DELIMITER)
        .map(|line| parse_filter(header, line))
        .collect::<ProcessResult<Vec<_>>>()?;

    let set = FilterSet::new(filters);
    debug!(
        "Parsed {} filter(s) over {} column(s)",
        set.len(),
        set.group_count()
    );
    Ok(set)
}

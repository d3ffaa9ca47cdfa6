//! Row-at-a-time executor.
//!
//! Each input row flows through the entire stage chain before the next row is
//! read. The first stage error aborts the run and discards everything
//! produced so far.

use log::trace;

use crate::error::ProcessResult;
use crate::record::Row;
use crate::stage::RowStage;

/// Push a single row through every stage, stopping when one drops it.
fn push_through_stages(row: Row, stages: &[Box<dyn RowStage>]) -> ProcessResult<Option<Row>> {
    let mut current = row;
    for stage in stages {
        let line = current.line();
        match stage.process(current)? {
            Some(next) => current = next,
            None => {
                trace!("line {line}: dropped by {}", stage.name());
                return Ok(None);
            }
        }
    }
    Ok(Some(current))
}

/// Execute the stage chain over `input`.
///
/// Returns the surviving rows and the number of rows read.
pub fn execute_rows<I>(input: I, stages: &[Box<dyn RowStage>]) -> ProcessResult<(Vec<Row>, usize)>
where
    I: IntoIterator<Item = Row>,
{
    let mut output = Vec::new();
    let mut read = 0;

    for row in input {
        read += 1;
        if let Some(row) = push_through_stages(row, stages)? {
            output.push(row);
        }
    }

    Ok((output, read))
}

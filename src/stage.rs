//! Row-at-a-time stages.
//!
//! A `RowStage` takes one data row and either passes it on (possibly
//! rewritten) or drops it. The processor chains a filter stage and a
//! projection stage; the executor pushes each row through the chain before
//! reading the next.

use crate::error::ProcessResult;
use crate::filter::FilterSet;
use crate::record::Row;
use crate::select::SelectionPlan;

/// A processing stage that handles rows one at a time.
pub trait RowStage {
    /// Process one row. `Ok(None)` drops it.
    fn process(&self, row: Row) -> ProcessResult<Option<Row>>;

    /// The display name of this stage.
    fn name(&self) -> &str;
}

/// FILTER - keeps rows accepted by every column group.
pub struct FilterStage {
    filters: FilterSet,
}

impl FilterStage {
    pub fn new(filters: FilterSet) -> Self {
        Self { filters }
    }
}

impl RowStage for FilterStage {
    fn process(&self, row: Row) -> ProcessResult<Option<Row>> {
        if self.filters.matches(&row)? {
            Ok(Some(row))
        } else {
            Ok(None)
        }
    }

    fn name(&self) -> &str {
        "FILTER"
    }
}

/// PROJECT - keeps the planned fields, in header order.
pub struct ProjectStage {
    plan: SelectionPlan,
}

impl ProjectStage {
    pub fn new(plan: SelectionPlan) -> Self {
        Self { plan }
    }
}

impl RowStage for ProjectStage {
    fn process(&self, row: Row) -> ProcessResult<Option<Row>> {
        self.plan.project(&row).map(Some)
    }

    fn name(&self) -> &str {
        "PROJECT"
    }
}

/// The stage chain for one call: filter first, then project.
pub fn build_stages(filters: FilterSet, plan: SelectionPlan) -> Vec<Box<dyn RowStage>> {
    vec![
        Box::new(FilterStage::new(filters)),
        Box::new(ProjectStage::new(plan)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessError;
    use crate::filter::{Comparator, Filter};
    use crate::select::select_columns;

    fn header() -> Vec<String> {
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    }

    #[test]
    fn test_filter_stage() {
        let stage = FilterStage::new(FilterSet::new(vec![Filter::new(1, Comparator::Ge, "5")]));
        assert_eq!(stage.name(), "FILTER");
        assert!(stage.process(Row::from_line(2, "1,2,3")).unwrap().is_none());

        let kept = stage.process(Row::from_line(3, "4,5,6")).unwrap().unwrap();
        assert_eq!(kept.fields(), &["4", "5", "6"]);
    }

    #[test]
    fn test_project_stage() {
        let stage = ProjectStage::new(select_columns(&header(), "c,a").unwrap());
        assert_eq!(stage.name(), "PROJECT");

        let out = stage.process(Row::from_line(2, "1,2,3")).unwrap().unwrap();
        assert_eq!(out.to_line(), "1,3");
    }

    #[test]
    fn test_stage_errors_propagate() {
        let stage = ProjectStage::new(select_columns(&header(), "c").unwrap());
        assert!(matches!(
            stage.process(Row::from_line(2, "1")),
            Err(ProcessError::RowShape { .. })
        ));
    }

    #[test]
    fn test_build_stages_order() {
        let stages = build_stages(FilterSet::new(vec![]), SelectionPlan::all(&header()));
        let names: Vec<&str> = stages.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["FILTER", "PROJECT"]);
    }
}

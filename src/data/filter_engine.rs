use serde::Serialize;
use tracing::debug;

use crate::data::group_index::GroupIndex;
use crate::data::schedule_table::ScheduleTable;

/// Counts after a filter pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FilterSummary {
    pub visible_rows: usize,
    pub total_rows: usize,
    pub visible_groups: usize,
    pub total_groups: usize,
}

/// Shows or hides rows by substring match, whole groups at a time
pub struct FilterEngine;

impl FilterEngine {
    /// Apply `query` to every row. A group is shown when its combined text
    /// contains the query anywhere; ungrouped rows are matched on their own
    /// text. Row order is never touched.
    pub fn apply(index: &GroupIndex, table: &mut ScheduleTable, query: &str) -> FilterSummary {
        let query = query.to_lowercase();
        let mut summary = FilterSummary {
            total_rows: table.row_count(),
            total_groups: index.group_count(),
            ..FilterSummary::default()
        };

        for group in index.groups() {
            let is_match = group.search_text().contains(&query);
            for &row in group.rows() {
                table.set_visible(row, is_match);
            }
            if is_match {
                summary.visible_groups += 1;
                summary.visible_rows += group.rows().len();
            }
        }

        for &row in index.ungrouped() {
            let is_match = table
                .row(row)
                .is_some_and(|r| r.text().to_lowercase().contains(&query));
            table.set_visible(row, is_match);
            if is_match {
                summary.visible_rows += 1;
            }
        }

        debug!(
            target: "filter",
            "Filter '{}': {}/{} rows, {}/{} groups visible",
            query,
            summary.visible_rows,
            summary.total_rows,
            summary.visible_groups,
            summary.total_groups
        );

        summary
    }
}

use tracing::{debug, info, trace};

use crate::data::filter_engine::{FilterEngine, FilterSummary};
use crate::data::group_index::GroupIndex;
use crate::data::schedule_table::{RowId, ScheduleTable};
use crate::data::sort_engine::SortEngine;
use crate::data::sort_state::{SortDirection, SortState};

/// Keys a focused row can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKey {
    Enter,
    Space,
    Other,
}

impl RowKey {
    pub fn parse(key: &str) -> Self {
        match key.to_lowercase().as_str() {
            "enter" | "return" => RowKey::Enter,
            "space" | " " => RowKey::Space,
            _ => RowKey::Other,
        }
    }
}

/// Result of delivering a key to a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKeyOutcome {
    /// The key would activate the row; no action is attached yet
    Reserved,
    Ignored,
}

/// Everything the event handlers share: the table, its group index, the
/// sort state, the last filter text and what that filter left visible.
#[derive(Debug, Clone)]
pub struct ScheduleView {
    table: ScheduleTable,
    index: GroupIndex,
    sorter: SortEngine,
    sort_state: SortState,
    filter_text: String,
    filter_summary: FilterSummary,
}

impl ScheduleView {
    /// Build the group index once, make every row focusable and start
    /// with nothing filtered out
    pub fn new(mut table: ScheduleTable, sorter: SortEngine) -> Self {
        let index = GroupIndex::build(&table);

        let ids: Vec<RowId> = table.body_order().to_vec();
        for id in ids {
            table.set_tab_index(id, 0);
        }
        let filter_summary = FilterEngine::apply(&index, &mut table, "");

        info!(
            target: "view",
            "Schedule ready: {} rows, {} groups, {} ungrouped",
            table.row_count(),
            index.group_count(),
            index.ungrouped().len()
        );

        Self {
            table,
            index,
            sorter,
            sort_state: SortState::Unsorted,
            filter_text: String::new(),
            filter_summary,
        }
    }

    pub fn table(&self) -> &ScheduleTable {
        &self.table
    }

    pub fn index(&self) -> &GroupIndex {
        &self.index
    }

    pub fn sort_state(&self) -> SortState {
        self.sort_state
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Counts left by the last filter. Sorting never changes them.
    pub fn filter_summary(&self) -> FilterSummary {
        self.filter_summary
    }

    /// Handle a change of the filter input
    pub fn on_filter_input(&mut self, text: &str) -> FilterSummary {
        self.filter_text = text.to_string();
        self.filter_summary = FilterEngine::apply(&self.index, &mut self.table, text);
        self.filter_summary
    }

    /// Handle a click on a header. Returns the new direction, or `None`
    /// when the header does not exist or is not sortable.
    pub fn on_header_click(&mut self, column: usize) -> Option<SortDirection> {
        if !self.table.header(column).is_some_and(|h| h.sortable) {
            debug!(target: "view", "Ignoring click on non-sortable column {}", column);
            return None;
        }

        self.sort_state = self.sort_state.click(column);
        let active = self.sort_state.active();
        self.table.set_sort_indicator(active);

        let (_, direction) = active?;
        self.sorter
            .sort_by_column(&self.index, &mut self.table, column, direction);
        Some(direction)
    }

    /// Handle a key press on a focused row
    pub fn on_row_key(&self, row: RowId, key: RowKey) -> RowKeyOutcome {
        match key {
            RowKey::Enter | RowKey::Space => {
                trace!(target: "view", "Activation key {:?} on row {}", key, row);
                RowKeyOutcome::Reserved
            }
            RowKey::Other => RowKeyOutcome::Ignored,
        }
    }
}

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::data::schedule_table::{RowId, ScheduleTable};

/// Rows that belong to one course
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    key: String,
    rows: Vec<RowId>,
    main_row: Option<RowId>,
    search_text: String,
}

impl Group {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            rows: Vec::new(),
            main_row: None,
            search_text: String::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Member rows in original document order
    pub fn rows(&self) -> &[RowId] {
        &self.rows
    }

    /// Row whose cells are used when sorting
    pub fn main_row(&self) -> Option<RowId> {
        self.main_row
    }

    /// Lowercased text of every member row, each followed by a space
    pub fn search_text(&self) -> &str {
        &self.search_text
    }
}

/// Partition of the body rows into groups and ungrouped rows.
///
/// Built once from the table; membership and main rows never change after.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: IndexMap<String, Group>,
    ungrouped: Vec<RowId>,
}

impl GroupIndex {
    /// Scan the body once in document order
    pub fn build(table: &ScheduleTable) -> Self {
        let mut index = GroupIndex::default();

        for (id, row) in table.rows_in_order() {
            let Some(key) = row.group() else {
                index.ungrouped.push(id);
                continue;
            };

            let group = index
                .groups
                .entry(key.to_string())
                .or_insert_with(|| Group::new(key));
            group.rows.push(id);
            group.search_text.push_str(&row.text().to_lowercase());
            group.search_text.push(' ');

            if row.is_main() {
                if let Some(previous) = group.main_row {
                    warn!(
                        target: "group_index",
                        "Group '{}' has several main rows, {} replaces {}", key, id, previous
                    );
                }
                group.main_row = Some(id);
            }
        }

        debug!(
            target: "group_index",
            "Built index: {} groups, {} ungrouped rows",
            index.groups.len(),
            index.ungrouped.len()
        );

        index
    }

    /// Groups in the order they were first seen
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.groups.get(key)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn ungrouped(&self) -> &[RowId] {
        &self.ungrouped
    }
}

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::OnceLock;
use tracing::debug;

use crate::data::group_index::{Group, GroupIndex};
use crate::data::schedule_table::{ColumnValueSource, RowId, ScheduleTable};
use crate::data::sort_state::SortDirection;

/// Minutes value for a time cell that cannot be parsed; sorts last ascending
pub const UNPARSABLE_TIME: u32 = 9999;

/// Ordinal for a day cell that is not mapped; sorts last ascending
pub const UNKNOWN_DAY: u8 = 7;

static TIME_PATTERN: OnceLock<Regex> = OnceLock::new();

fn time_pattern() -> &'static Regex {
    TIME_PATTERN.get_or_init(|| {
        Regex::new(r"([0-9]+):([0-9]+)\s*(AM|PM)").expect("time pattern is a valid regex")
    })
}

/// Minutes since midnight of the first `H:MM AM|PM` in `value`.
///
/// `"1:00 PM - 2:40 PM"` gives 780; 12 AM is midnight and 12 PM is noon.
pub fn time_to_minutes(value: &str) -> u32 {
    let Some(caps) = time_pattern().captures(value) else {
        return UNPARSABLE_TIME;
    };

    let (Ok(hours), Ok(minutes)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
        return UNPARSABLE_TIME;
    };

    let hours = match (&caps[3], hours) {
        ("PM", h) if h != 12 => h.saturating_add(12),
        ("AM", 12) => 0,
        (_, h) => h,
    };

    hours
        .checked_mul(60)
        .and_then(|m| m.checked_add(minutes))
        .unwrap_or(UNPARSABLE_TIME)
}

/// Which day names get an ordinal when sorting a "day" column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeekdayMapping {
    /// Sunday through Thursday only; Friday and Saturday share the sentinel
    #[default]
    SundayToThursday,
    /// All seven days
    FullWeek,
}

impl WeekdayMapping {
    pub fn ordinal(self, value: &str) -> u8 {
        match (value.to_lowercase().as_str(), self) {
            ("sunday", _) => 0,
            ("monday", _) => 1,
            ("tuesday", _) => 2,
            ("wednesday", _) => 3,
            ("thursday", _) => 4,
            ("friday", WeekdayMapping::FullWeek) => 5,
            ("saturday", WeekdayMapping::FullWeek) => 6,
            _ => UNKNOWN_DAY,
        }
    }
}

/// Ordinal of a day name with the default mapping (case-insensitive)
pub fn day_to_ordinal(value: &str) -> u8 {
    WeekdayMapping::default().ordinal(value)
}

/// How values of a column are compared, chosen by its semantic name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Time,
    Day,
    Text,
}

impl ColumnKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "time" => ColumnKind::Time,
            "day" => ColumnKind::Day,
            _ => ColumnKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Minutes(u32),
    Day(u8),
    Text(String),
}

/// Reorders whole groups by the value in their main row
#[derive(Debug, Clone, Copy, Default)]
pub struct SortEngine {
    weekdays: WeekdayMapping,
}

impl SortEngine {
    pub fn new(weekdays: WeekdayMapping) -> Self {
        Self { weekdays }
    }

    fn sort_key(&self, kind: ColumnKind, value: &str) -> SortKey {
        match kind {
            ColumnKind::Time => SortKey::Minutes(time_to_minutes(value)),
            ColumnKind::Day => SortKey::Day(self.weekdays.ordinal(value)),
            ColumnKind::Text => SortKey::Text(value.to_lowercase()),
        }
    }

    /// Order in which groups should appear, as positions into `groups`.
    ///
    /// Groups without a main row compare equal to everything: they keep
    /// their slot and the others are sorted around them. Ties keep the
    /// incoming order.
    pub fn sort_groups<S: ColumnValueSource>(
        &self,
        groups: &[&Group],
        source: &S,
        column: usize,
        kind: ColumnKind,
        direction: SortDirection,
    ) -> Vec<usize> {
        let mut slots = Vec::new();
        let mut keyed = Vec::new();
        for (pos, group) in groups.iter().enumerate() {
            if let Some(main) = group.main_row() {
                slots.push(pos);
                keyed.push((pos, self.sort_key(kind, &source.column_value(main, column))));
            }
        }

        keyed.sort_by(|(_, a), (_, b)| {
            let ord: Ordering = a.cmp(b);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });

        let mut order: Vec<usize> = (0..groups.len()).collect();
        for (slot, (pos, _)) in slots.into_iter().zip(keyed) {
            order[slot] = pos;
        }
        order
    }

    /// Sort the table body by `column`. Each group's rows are re-appended
    /// together in their original order, then every ungrouped row in its
    /// original order. Returns the group keys in their new order.
    pub fn sort_by_column(
        &self,
        index: &GroupIndex,
        table: &mut ScheduleTable,
        column: usize,
        direction: SortDirection,
    ) -> Vec<String> {
        let name = table.header_name(column).to_string();
        let kind = ColumnKind::from_name(&name);

        let groups: Vec<&Group> = index.groups().collect();
        let order = self.sort_groups(&groups, &*table, column, kind, direction);

        let mut rows: Vec<RowId> = Vec::with_capacity(table.row_count());
        for &pos in &order {
            rows.extend_from_slice(groups[pos].rows());
        }
        rows.extend_from_slice(index.ungrouped());
        table.append_to_body(&rows);

        debug!(
            target: "sort",
            "Sorted {} groups by column {} ('{}', {:?}) {}",
            groups.len(),
            column,
            name,
            kind,
            direction
        );

        order.into_iter().map(|pos| groups[pos].key().to_string()).collect()
    }
}

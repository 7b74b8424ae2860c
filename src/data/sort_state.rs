use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// CSS class used on the header carrying this direction
    pub fn css_class(self) -> &'static str {
        match self {
            SortDirection::Ascending => "sort-asc",
            SortDirection::Descending => "sort-desc",
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

/// Sort state of a header set. At most one column is active at a time and
/// there is no way back to `Unsorted` once a header has been clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortState {
    #[default]
    Unsorted,
    Ascending(usize),
    Descending(usize),
}

impl SortState {
    /// Transition for a click on `column`
    pub fn click(self, column: usize) -> SortState {
        match self {
            SortState::Ascending(active) if active == column => SortState::Descending(column),
            _ => SortState::Ascending(column),
        }
    }

    /// Active column and direction
    pub fn active(self) -> Option<(usize, SortDirection)> {
        match self {
            SortState::Unsorted => None,
            SortState::Ascending(column) => Some((column, SortDirection::Ascending)),
            SortState::Descending(column) => Some((column, SortDirection::Descending)),
        }
    }

    /// Marking for a given column, `None` unless it is the active one
    pub fn indicator_for(self, column: usize) -> Option<SortDirection> {
        self.active()
            .filter(|(active, _)| *active == column)
            .map(|(_, direction)| direction)
    }
}

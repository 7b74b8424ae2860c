pub mod config;
pub mod data;
pub mod html;
pub mod utils;

pub use data::filter_engine::{FilterEngine, FilterSummary};
pub use data::group_index::{Group, GroupIndex};
pub use data::schedule_table::{
    CellKind, ColumnValueSource, HeaderCell, RowId, ScheduleRow, ScheduleTable, TableCell,
};
pub use data::schedule_view::{RowKey, RowKeyOutcome, ScheduleView};
pub use data::sort_engine::{day_to_ordinal, time_to_minutes, SortEngine, WeekdayMapping};
pub use data::sort_state::{SortDirection, SortState};

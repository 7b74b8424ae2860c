//! Data layer: the table model and the engines that work on it
//!
//! The table is plain data; grouping, filtering and sorting operate on it
//! through `ScheduleView`, which owns the index built at load time.

pub mod schedule_table;
pub mod sort_state;

pub mod filter_engine;
pub mod group_index;
pub mod sort_engine;

pub mod schedule_exporter;
pub mod schedule_view;

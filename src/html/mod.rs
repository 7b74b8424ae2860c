//! HTML boundary of the schedule
//!
//! Markup is parsed once into a `ScheduleTable`; output is regenerated from
//! the model, so row order, visibility, focus and sort markings reflect the
//! current view.

pub mod loader;
pub mod writer;

pub use loader::{load_schedule, load_schedule_file};
pub use writer::render_schedule;

//! Configuration module
//!
//! Settings for locating the schedule in markup, sorting policy, terminal
//! display and logging.

pub mod config;

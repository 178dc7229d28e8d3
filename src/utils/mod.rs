//! Utility functions and helpers
//!
//! Atomic document writes and calendar helpers used by the history filter.

pub mod atomic;
pub mod time;

pub use atomic::{
    atomic_write_async, cleanup_temp_files, preserve_corrupt, temp_path_for, TEMP_SUFFIX,
};
pub use time::{end_of_day, export_stamp, start_of_day};

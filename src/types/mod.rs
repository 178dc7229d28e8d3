//! Entity model for the picker
//!
//! Students, groups and pick-history records, plus the roster document
//! that carries students and groups together.

mod group;
mod history;
mod roster;
mod student;

pub use group::Group;
pub use history::{HistoryItem, PickSubject, SelectionMode};
pub use roster::Roster;
pub use student::{clamp_weight, Student, MAX_WEIGHT, MIN_WEIGHT};

/// Default student weight for serde deserialization
pub fn default_weight() -> i32 {
    1
}

/// Serde default for `active`/`isActive` flags
pub fn default_true() -> bool {
    true
}

//! Export/import bridge
//!
//! Turns roster and history snapshots into files (CSV, JSON) and parses
//! CSV student/group lists back into entities. Merging parsed entities into
//! the roster goes through the store's commands, never around them.

mod export;
mod format;
mod import;

pub use export::{ExportSnapshot, Exporter, GROUP_HEADER, HISTORY_HEADER, STUDENT_HEADER};
pub use format::{ExportFormat, ExportKind};
pub use import::{
    import_groups, import_groups_from_path, import_students, import_students_from_path, Imported,
};

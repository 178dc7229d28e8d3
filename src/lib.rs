//! Classroom Random Picker
//!
//! Roster storage and selection engine for picking students or groups at
//! random. The roster (students and groups) and the pick history are kept as
//! two JSON documents that are always replaced atomically.
//!
//! # Features
//!
//! - **Fail-soft persistence**: missing or corrupt documents load as empty
//! - **Uniform and weighted picks** over active students
//! - **Balanced partition**: group sizes differ by at most one
//! - **Bounded history** with text, date and mode filters
//! - **Export/Import**: CSV and JSON snapshots, CSV roster imports
//!
//! # Modules
//!
//! - `types`: Core data structures (Student, Group, HistoryItem, Roster)
//! - `store`: Documents, id allocation, roster commands, session store
//! - `selector`: Random picks and balanced partitioning
//! - `history`: Bounded pick log and filters
//! - `transfer`: Export and import bridge
//! - `config`: Typed settings
//! - `utils`: Atomic writes and calendar helpers
//!
//! # Example
//!
//! ```no_run
//! use rand_picker::{PickerConfig, Store};
//!
//! #[tokio::main]
//! async fn main() -> rand_picker::PickerResult<()> {
//!     let store = Store::open(PickerConfig::load(None)?).await;
//!     store.add_student("Ada", 1, true, None).await?;
//!     if let Some(student) = store.pick_student(false).await.value {
//!         println!("{}", student.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod selector;
pub mod store;
pub mod transfer;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{ExportSettings, PickerConfig};
pub use error::{PickerError, PickerResult};
pub use history::{HistoryFilter, HistoryLog};
pub use store::{Committed, HistoryFile, RosterFile, Store};
pub use transfer::{ExportFormat, ExportKind, ExportSnapshot, Exporter};
pub use types::{Group, HistoryItem, Roster, SelectionMode, Student};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

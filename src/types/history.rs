//! Pick history records

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{Group, Student};

/// What kind of entity a pick selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionMode {
    Individual,
    Group,
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMode::Individual => write!(f, "Individual"),
            SelectionMode::Group => write!(f, "Group"),
        }
    }
}

impl std::str::FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" | "student" => Ok(SelectionMode::Individual),
            "group" => Ok(SelectionMode::Group),
            other => Err(format!("unknown selection mode '{}'", other)),
        }
    }
}

/// Session-only pointer at the picked entity
///
/// Holds an id rather than the entity, and is never persisted: a later
/// delete of the student or group leaves the history record intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickSubject {
    Student(u32),
    Group(u32),
}

/// One recorded pick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub mode: SelectionMode,
    #[serde(rename = "selectedName")]
    pub selected_name: String,
    #[serde(rename = "selectionTime")]
    pub selection_time: DateTime<Local>,
    #[serde(default)]
    pub details: String,
    #[serde(skip)]
    pub subject: Option<PickSubject>,
}

impl HistoryItem {
    /// Record an individual pick at the current time
    pub fn for_student(student: &Student) -> Self {
        Self {
            mode: SelectionMode::Individual,
            selected_name: student.name.clone(),
            selection_time: Local::now(),
            details: format!("ID: {}, Weight: {}", student.id, student.weight),
            subject: Some(PickSubject::Student(student.id)),
        }
    }

    /// Record a group pick; `members` are the group's resolved students
    pub fn for_group(group: &Group, members: &[Student]) -> Self {
        let names: Vec<&str> = members.iter().map(|s| s.name.as_str()).collect();
        Self {
            mode: SelectionMode::Group,
            selected_name: group.name.clone(),
            selection_time: Local::now(),
            details: format!("Members: {}", names.join(", ")),
            subject: Some(PickSubject::Group(group.id)),
        }
    }

    /// Override the timestamp (imports and tests)
    pub fn at(mut self, time: DateTime<Local>) -> Self {
        self.selection_time = time;
        self
    }

    pub fn formatted_time(&self) -> String {
        self.selection_time.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl PartialEq for HistoryItem {
    // The session-only subject does not take part in equality.
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode
            && self.selected_name == other.selected_name
            && self.selection_time == other.selection_time
            && self.details == other.details
    }
}

//! Group record

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::default_true;

/// A named set of students
///
/// `student_ids` is checked against the roster when membership changes;
/// it is not re-validated continuously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "studentIds", default)]
    pub student_ids: Vec<u32>,
    #[serde(rename = "createdTime", default = "Local::now")]
    pub created_time: DateTime<Local>,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
}

impl Group {
    /// Create an empty, active group stamped with the current time
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            student_ids: Vec::new(),
            created_time: Local::now(),
            is_active: true,
        }
    }

    /// Builder-style member list setter
    pub fn with_members(mut self, student_ids: Vec<u32>) -> Self {
        self.student_ids = student_ids;
        self
    }

    pub fn contains(&self, student_id: u32) -> bool {
        self.student_ids.contains(&student_id)
    }

    pub fn member_count(&self) -> usize {
        self.student_ids.len()
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} members)", self.name, self.student_ids.len())
    }
}

//! Roster document: students and groups persisted together

use serde::{Deserialize, Serialize};

use super::{Group, Student};

/// The `{students, groups}` dataset, saved and loaded as one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Roster {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Roster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a roster from existing collections
    pub fn with_data(students: Vec<Student>, groups: Vec<Group>) -> Self {
        Self { students, groups }
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty() && self.groups.is_empty()
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Split into the `(students, groups)` pair
    pub fn into_parts(self) -> (Vec<Student>, Vec<Group>) {
        (self.students, self.groups)
    }
}

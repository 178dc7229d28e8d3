//! Id allocation
//!
//! Ids are `max(existing) + 1`, or `1` for an empty collection. Gaps below
//! the maximum are never reused.

use crate::types::{Group, Student};

/// Next free student id
pub fn next_student_id(students: &[Student]) -> u32 {
    students.iter().map(|s| s.id).max().map_or(1, |max| max + 1)
}

/// Next free group id
pub fn next_group_id(groups: &[Group]) -> u32 {
    groups.iter().map(|g| g.id).max().map_or(1, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collections_start_at_one() {
        assert_eq!(next_student_id(&[]), 1);
        assert_eq!(next_group_id(&[]), 1);
    }

    #[test]
    fn test_gaps_are_not_reused() {
        let students = vec![Student::new(1, "A"), Student::new(7, "B"), Student::new(3, "C")];
        assert_eq!(next_student_id(&students), 8);

        let groups = vec![Group::new(10, "X"), Group::new(2, "Y")];
        assert_eq!(next_group_id(&groups), 11);
    }
}

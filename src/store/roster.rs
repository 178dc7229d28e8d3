//! Roster commands and queries
//!
//! Every command validates before it mutates, so a rejected call leaves the
//! roster untouched. Membership ids are checked against the students present
//! at the time of the change.

use std::collections::HashSet;

use chrono::Local;
use tracing::warn;

use crate::error::{PickerError, PickerResult};
use crate::types::{clamp_weight, Group, Roster, Student};

use super::ids::{next_group_id, next_student_id};

fn require_name(name: &str, what: &str) -> PickerResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PickerError::Validation(format!("{} name must not be empty", what)));
    }
    Ok(name.to_string())
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl Roster {
    pub fn student(&self, id: u32) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn group(&self, id: u32) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    fn student_mut(&mut self, id: u32) -> PickerResult<&mut Student> {
        self.students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| PickerError::student_not_found(id))
    }

    fn group_mut(&mut self, id: u32) -> PickerResult<&mut Group> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| PickerError::group_not_found(id))
    }

    fn ensure_unique_group_name(&self, name: &str, except: Option<u32>) -> PickerResult<()> {
        if self
            .groups
            .iter()
            .any(|g| g.name == name && Some(g.id) != except)
        {
            return Err(PickerError::Validation(format!(
                "a group named '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    // ---- students ----

    /// Add a student under the next free id
    pub fn add_student(
        &mut self,
        name: &str,
        weight: i32,
        active: bool,
        avatar_path: Option<String>,
    ) -> PickerResult<Student> {
        let name = require_name(name, "Student")?;
        let student = Student {
            id: next_student_id(&self.students),
            name,
            weight: clamp_weight(weight),
            active,
            avatar_path,
        };
        self.students.push(student.clone());
        Ok(student)
    }

    /// Add a student that carries its own id
    ///
    /// A colliding id is replaced by a freshly allocated one; the returned
    /// student holds the id actually used.
    pub fn insert_student(&mut self, mut student: Student) -> PickerResult<Student> {
        if student.id == 0 {
            return Err(PickerError::Validation("student id must be positive".into()));
        }
        student.name = require_name(&student.name, "Student")?;
        student.weight = clamp_weight(student.weight);

        if self.student(student.id).is_some() {
            student.id = next_student_id(&self.students);
        }
        self.students.push(student.clone());
        Ok(student)
    }

    /// Overwrite the mutable fields of an existing student
    pub fn update_student(&mut self, student: &Student) -> PickerResult<Student> {
        let name = require_name(&student.name, "Student")?;
        let existing = self.student_mut(student.id)?;
        existing.name = name;
        existing.weight = clamp_weight(student.weight);
        existing.active = student.active;
        existing.avatar_path = student.avatar_path.clone();
        Ok(existing.clone())
    }

    /// Remove a student and drop its id from every group
    ///
    /// Returns `false` when the student was already absent.
    pub fn delete_student(&mut self, id: u32) -> bool {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        let removed = self.students.len() != before;

        for group in &mut self.groups {
            group.student_ids.retain(|&sid| sid != id);
        }

        removed
    }

    /// Set one student's weight, clamped to the allowed range
    pub fn set_weight(&mut self, id: u32, weight: i32) -> PickerResult<i32> {
        let student = self.student_mut(id)?;
        student.weight = clamp_weight(weight);
        Ok(student.weight)
    }

    pub fn reset_weights(&mut self, weight: i32) {
        let weight = clamp_weight(weight);
        for student in &mut self.students {
            student.weight = weight;
        }
    }

    pub fn set_all_active(&mut self, active: bool) {
        for student in &mut self.students {
            student.active = active;
        }
    }

    /// Merge imported students by id: known ids are updated, new ids added
    ///
    /// Returns `(added, updated)`.
    pub fn merge_students(&mut self, imported: Vec<Student>) -> PickerResult<(usize, usize)> {
        for student in &imported {
            if student.id == 0 {
                return Err(PickerError::Validation("student id must be positive".into()));
            }
            require_name(&student.name, "Student")?;
        }

        let mut added = 0;
        let mut updated = 0;
        for student in imported {
            if self.student(student.id).is_some() {
                self.update_student(&student)?;
                updated += 1;
            } else {
                self.insert_student(student)?;
                added += 1;
            }
        }
        Ok((added, updated))
    }

    // ---- groups ----

    /// Every id must name a current student; repeats keep their first position
    fn checked_members(&self, student_ids: &[u32]) -> PickerResult<Vec<u32>> {
        if let Some(&missing) = student_ids.iter().find(|&&sid| self.student(sid).is_none()) {
            return Err(PickerError::student_not_found(missing));
        }

        let mut seen = HashSet::new();
        Ok(student_ids
            .iter()
            .copied()
            .filter(|sid| seen.insert(*sid))
            .collect())
    }

    /// Add an empty group under the next free id
    pub fn add_group(&mut self, name: &str, description: &str) -> PickerResult<Group> {
        self.add_group_with_members(name, description, &[])
    }

    /// Add a group and its members in one step
    ///
    /// Name and members are both checked before anything is added.
    pub fn add_group_with_members(
        &mut self,
        name: &str,
        description: &str,
        student_ids: &[u32],
    ) -> PickerResult<Group> {
        let name = require_name(name, "Group")?;
        self.ensure_unique_group_name(&name, None)?;
        let members = self.checked_members(student_ids)?;

        let mut group = Group::new(next_group_id(&self.groups), name).with_members(members);
        group.description = description.trim().to_string();
        self.groups.push(group.clone());
        Ok(group)
    }

    /// Overwrite name, description and active flag; membership is untouched
    pub fn update_group(
        &mut self,
        id: u32,
        name: &str,
        description: &str,
        is_active: bool,
    ) -> PickerResult<Group> {
        let name = require_name(name, "Group")?;
        self.ensure_unique_group_name(&name, Some(id))?;

        let group = self.group_mut(id)?;
        group.name = name;
        group.description = description.trim().to_string();
        group.is_active = is_active;
        Ok(group.clone())
    }

    /// Remove a group; `false` if it was already absent
    pub fn delete_group(&mut self, id: u32) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        self.groups.len() != before
    }

    /// Replace a group's member list
    ///
    /// Every id must name a current student. Repeated ids keep their first
    /// position.
    pub fn set_group_members(&mut self, id: u32, student_ids: &[u32]) -> PickerResult<Group> {
        let members = self.checked_members(student_ids)?;
        let group = self.group_mut(id)?;
        group.student_ids = members;
        Ok(group.clone())
    }

    /// Append one student to a group; `false` if already a member
    pub fn add_member(&mut self, group_id: u32, student_id: u32) -> PickerResult<bool> {
        if self.student(student_id).is_none() {
            return Err(PickerError::student_not_found(student_id));
        }
        let group = self.group_mut(group_id)?;
        if group.contains(student_id) {
            return Ok(false);
        }
        group.student_ids.push(student_id);
        Ok(true)
    }

    /// Drop one student from a group; `false` if not a member
    pub fn remove_member(&mut self, group_id: u32, student_id: u32) -> PickerResult<bool> {
        let group = self.group_mut(group_id)?;
        let before = group.student_ids.len();
        group.student_ids.retain(|&sid| sid != student_id);
        Ok(group.student_ids.len() != before)
    }

    /// Swap in a whole new group collection
    ///
    /// Used by the balanced partition; membership is validated up front so the
    /// swap either happens completely or not at all.
    pub fn replace_groups(&mut self, groups: Vec<Group>) -> PickerResult<()> {
        let mut ids = HashSet::new();
        let mut names: HashSet<&str> = HashSet::new();
        for group in groups.iter() {
            if group.id == 0 {
                return Err(PickerError::Validation("group id must be positive".into()));
            }
            require_name(&group.name, "Group")?;
            if !ids.insert(group.id) {
                return Err(PickerError::Validation(format!("duplicate group id {}", group.id)));
            }
            if !names.insert(group.name.as_str()) {
                return Err(PickerError::Validation(format!(
                    "duplicate group name '{}'",
                    group.name
                )));
            }
            if let Some(&missing) = group.student_ids.iter().find(|&&sid| self.student(sid).is_none()) {
                return Err(PickerError::student_not_found(missing));
            }
        }
        drop(names);

        self.groups = groups;
        Ok(())
    }

    /// Add imported groups, skipping names that already exist
    ///
    /// Member ids that no longer resolve are dropped. Returns how many groups
    /// were added.
    pub fn merge_groups(&mut self, imported: Vec<Group>) -> usize {
        let mut added = 0;
        for mut group in imported {
            let Ok(name) = require_name(&group.name, "Group") else {
                continue;
            };
            if self.group_by_name(&name).is_some() {
                continue;
            }

            let mut seen = HashSet::new();
            group
                .student_ids
                .retain(|&sid| self.student(sid).is_some() && seen.insert(sid));
            group.id = next_group_id(&self.groups);
            group.name = name;
            group.created_time = Local::now();
            self.groups.push(group);
            added += 1;
        }
        added
    }

    // ---- loading ----

    /// Bring a roster read from disk back in line with the roster invariants
    ///
    /// Drops students with id 0 or a blank name and later duplicates of a
    /// student id; drops groups with id 0, a blank name, or an id or name
    /// already taken; drops member ids that name no student or repeat.
    /// Weights are clamped. Returns how many repairs were made.
    pub fn repair(&mut self) -> usize {
        let mut repairs = 0;

        let mut student_ids = HashSet::new();
        self.students.retain_mut(|student| {
            if student.id == 0 || student.name.trim().is_empty() {
                warn!(id = student.id, "Dropping student without a valid id or name");
                repairs += 1;
                return false;
            }
            if !student_ids.insert(student.id) {
                warn!(id = student.id, name = %student.name, "Dropping student with a duplicate id");
                repairs += 1;
                return false;
            }
            let weight = clamp_weight(student.weight);
            if weight != student.weight {
                warn!(id = student.id, weight = student.weight, "Clamping out of range weight");
                student.weight = weight;
                repairs += 1;
            }
            true
        });

        let mut group_ids = HashSet::new();
        let mut group_names = HashSet::new();
        self.groups.retain(|group| {
            if group.id == 0 || group.name.trim().is_empty() {
                warn!(id = group.id, "Dropping group without a valid id or name");
                repairs += 1;
                return false;
            }
            if group_ids.contains(&group.id) || group_names.contains(&group.name) {
                warn!(id = group.id, name = %group.name, "Dropping group with a duplicate id or name");
                repairs += 1;
                return false;
            }
            group_ids.insert(group.id);
            group_names.insert(group.name.clone());
            true
        });

        for group in &mut self.groups {
            let mut seen = HashSet::new();
            let before = group.student_ids.len();
            group
                .student_ids
                .retain(|sid| student_ids.contains(sid) && seen.insert(*sid));
            let dropped = before - group.student_ids.len();
            if dropped > 0 {
                warn!(group = %group.name, dropped, "Dropping unknown or repeated member ids");
                repairs += dropped;
            }
        }

        repairs
    }

    // ---- queries ----

    pub fn active_students(&self) -> Vec<Student> {
        self.students.iter().filter(|s| s.active).cloned().collect()
    }

    pub fn active_groups(&self) -> Vec<Group> {
        self.groups.iter().filter(|g| g.is_active).cloned().collect()
    }

    /// Students of a group in membership order; stale ids are skipped
    pub fn members_of(&self, group_id: u32) -> PickerResult<Vec<Student>> {
        let group = self
            .group(group_id)
            .ok_or_else(|| PickerError::group_not_found(group_id))?;
        Ok(group
            .student_ids
            .iter()
            .filter_map(|&sid| self.student(sid).cloned())
            .collect())
    }

    /// Students that belong to no group
    pub fn ungrouped_students(&self) -> Vec<Student> {
        let grouped: HashSet<u32> = self
            .groups
            .iter()
            .flat_map(|g| g.student_ids.iter().copied())
            .collect();
        self.students
            .iter()
            .filter(|s| !grouped.contains(&s.id))
            .cloned()
            .collect()
    }

    /// Case-insensitive match on name, or exact match on id
    pub fn search_students(&self, text: &str) -> Vec<Student> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.students.clone();
        }
        self.students
            .iter()
            .filter(|s| contains_ci(&s.name, &needle) || s.id.to_string() == needle)
            .cloned()
            .collect()
    }

    /// Case-insensitive match on name or description
    pub fn search_groups(&self, text: &str) -> Vec<Group> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.groups.clone();
        }
        self.groups
            .iter()
            .filter(|g| contains_ci(&g.name, &needle) || contains_ci(&g.description, &needle))
            .cloned()
            .collect()
    }

    /// Ids referenced by groups that no longer name a student
    pub fn dangling_member_ids(&self) -> Vec<u32> {
        let known: HashSet<u32> = self.students.iter().map(|s| s.id).collect();
        let mut dangling: Vec<u32> = self
            .groups
            .iter()
            .flat_map(|g| g.student_ids.iter().copied())
            .filter(|sid| !known.contains(sid))
            .collect();
        dangling.sort_unstable();
        dangling.dedup();
        dangling
    }
}

//! Store - roster and history persistence
//!
//! [`Store`] is the single in-process owner of the roster and the history
//! log. Callers mutate through its commands and read through snapshots;
//! nothing else re-reads the documents behind its back.
//!
//! # Write path
//!
//! ```text
//! command ──► validate + mutate in memory ──► save whole document
//!             (write lock, no await)          (.tmp + fsync + rename)
//! ```
//!
//! A rejected command leaves memory untouched and writes nothing. A failed
//! save keeps the in-memory change and reports `persisted: false`.

mod document;
mod ids;
mod roster;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::PickerConfig;
use crate::error::PickerResult;
use crate::history::{HistoryFilter, HistoryLog};
use crate::selector;
use crate::transfer::ExportSnapshot;
use crate::types::{Group, HistoryItem, Roster, Student};
use crate::utils::cleanup_temp_files;

pub use document::{HistoryFile, RosterFile};
pub use ids::{next_group_id, next_student_id};

/// Result of a command that was applied in memory and then saved
#[derive(Debug, Clone, PartialEq)]
pub struct Committed<T> {
    pub value: T,
    /// `false` only when a save was attempted and failed
    pub persisted: bool,
}

impl<T> Committed<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Session store owning the authoritative roster and history
pub struct Store {
    config: PickerConfig,
    roster_file: RosterFile,
    history_file: HistoryFile,
    roster: RwLock<Roster>,
    history: RwLock<HistoryLog>,
    // Serialize writes per document so the last completed save carries the
    // latest in-memory state.
    roster_io: Mutex<()>,
    history_io: Mutex<()>,
}

impl Store {
    /// Open the documents named by `config`, creating missing ones
    pub async fn open(config: PickerConfig) -> Self {
        match cleanup_temp_files(config.data_dir()).await {
            Ok(0) => {}
            Ok(n) => info!(count = n, "Removed leftover temp files"),
            Err(e) => warn!(error = %e, "Could not clean temp files"),
        }

        let roster_file = RosterFile::new(config.roster_path());
        let history_file = HistoryFile::new(config.history_path());

        let (students, groups) = roster_file.load().await;
        let history = HistoryLog::from_items(history_file.load().await, config.history_capacity);

        Self {
            roster_file,
            history_file,
            roster: RwLock::new(Roster::with_data(students, groups)),
            history: RwLock::new(history),
            roster_io: Mutex::new(()),
            history_io: Mutex::new(()),
            config,
        }
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    // ---- persistence ----

    /// Re-read the roster document, replacing the in-memory copy
    pub async fn load_roster(&self) -> (Vec<Student>, Vec<Group>) {
        let _io = self.roster_io.lock().await;
        let (students, groups) = self.roster_file.load().await;
        *self.roster.write() = Roster::with_data(students.clone(), groups.clone());
        (students, groups)
    }

    /// Write the current roster as one document
    pub async fn save_roster(&self) -> bool {
        let _io = self.roster_io.lock().await;
        let snapshot = self.roster.read().clone();
        self.roster_file.save(&snapshot.students, &snapshot.groups).await
    }

    /// Re-read the history document, replacing the in-memory log
    pub async fn load_history(&self) -> Vec<HistoryItem> {
        let _io = self.history_io.lock().await;
        let items = self.history_file.load().await;
        let log = HistoryLog::from_items(items, self.config.history_capacity);
        let items = log.to_vec();
        *self.history.write() = log;
        items
    }

    /// Discard in-memory state and re-read both documents
    pub async fn reload(&self) {
        let (students, groups) = self.load_roster().await;
        let history = self.load_history().await;
        info!(
            students = students.len(),
            groups = groups.len(),
            history = history.len(),
            "Reloaded store"
        );
    }

    pub async fn save_history(&self) -> bool {
        let _io = self.history_io.lock().await;
        let items = self.history.read().to_vec();
        self.history_file.save(&items).await
    }

    async fn commit<T>(
        &self,
        command: impl FnOnce(&mut Roster) -> PickerResult<T>,
    ) -> PickerResult<Committed<T>> {
        let value = {
            let mut roster = self.roster.write();
            command(&mut roster)?
        };
        let persisted = self.save_roster().await;
        Ok(Committed { value, persisted })
    }

    // ---- reads ----

    /// Clone of the current roster
    pub fn snapshot(&self) -> Roster {
        self.roster.read().clone()
    }

    /// Run a read-only query against the roster
    pub fn read<R>(&self, query: impl FnOnce(&Roster) -> R) -> R {
        query(&self.roster.read())
    }

    pub fn students(&self) -> Vec<Student> {
        self.roster.read().students.clone()
    }

    pub fn groups(&self) -> Vec<Group> {
        self.roster.read().groups.clone()
    }

    pub fn next_student_id(&self) -> u32 {
        next_student_id(&self.roster.read().students)
    }

    pub fn next_group_id(&self) -> u32 {
        next_group_id(&self.roster.read().groups)
    }

    /// Everything an export needs, copied at one point in time
    pub fn export_snapshot(&self) -> ExportSnapshot {
        let roster = self.snapshot();
        ExportSnapshot {
            students: roster.students,
            groups: roster.groups,
            history: self.history.read().to_vec(),
        }
    }

    // ---- student commands ----

    pub async fn add_student(
        &self,
        name: &str,
        weight: i32,
        active: bool,
        avatar_path: Option<String>,
    ) -> PickerResult<Committed<Student>> {
        self.commit(|r| r.add_student(name, weight, active, avatar_path))
            .await
    }

    pub async fn insert_student(&self, student: Student) -> PickerResult<Committed<Student>> {
        self.commit(|r| r.insert_student(student)).await
    }

    pub async fn update_student(&self, student: &Student) -> PickerResult<Committed<Student>> {
        self.commit(|r| r.update_student(student)).await
    }

    /// Delete a student and its memberships in one save
    pub async fn delete_student(&self, id: u32) -> PickerResult<Committed<bool>> {
        self.commit(|r| Ok(r.delete_student(id))).await
    }

    pub async fn set_weight(&self, id: u32, weight: i32) -> PickerResult<Committed<i32>> {
        self.commit(|r| r.set_weight(id, weight)).await
    }

    pub async fn reset_weights(&self, weight: i32) -> PickerResult<Committed<()>> {
        self.commit(|r| {
            r.reset_weights(weight);
            Ok(())
        })
        .await
    }

    pub async fn set_all_active(&self, active: bool) -> PickerResult<Committed<()>> {
        self.commit(|r| {
            r.set_all_active(active);
            Ok(())
        })
        .await
    }

    /// Merge imported students; returns `(added, updated)`
    pub async fn import_students(
        &self,
        students: Vec<Student>,
    ) -> PickerResult<Committed<(usize, usize)>> {
        self.commit(|r| r.merge_students(students)).await
    }

    // ---- group commands ----

    pub async fn add_group(&self, name: &str, description: &str) -> PickerResult<Committed<Group>> {
        self.commit(|r| r.add_group(name, description)).await
    }

    /// Create a group with its members; nothing is saved if any id is unknown
    pub async fn add_group_with_members(
        &self,
        name: &str,
        description: &str,
        student_ids: &[u32],
    ) -> PickerResult<Committed<Group>> {
        self.commit(|r| r.add_group_with_members(name, description, student_ids))
            .await
    }

    pub async fn update_group(
        &self,
        id: u32,
        name: &str,
        description: &str,
        is_active: bool,
    ) -> PickerResult<Committed<Group>> {
        self.commit(|r| r.update_group(id, name, description, is_active))
            .await
    }

    pub async fn delete_group(&self, id: u32) -> PickerResult<Committed<bool>> {
        self.commit(|r| Ok(r.delete_group(id))).await
    }

    pub async fn set_group_members(
        &self,
        id: u32,
        student_ids: &[u32],
    ) -> PickerResult<Committed<Group>> {
        self.commit(|r| r.set_group_members(id, student_ids)).await
    }

    pub async fn add_member(&self, group_id: u32, student_id: u32) -> PickerResult<Committed<bool>> {
        self.commit(|r| r.add_member(group_id, student_id)).await
    }

    pub async fn remove_member(
        &self,
        group_id: u32,
        student_id: u32,
    ) -> PickerResult<Committed<bool>> {
        self.commit(|r| r.remove_member(group_id, student_id)).await
    }

    /// Add imported groups whose names are new; returns how many were added
    pub async fn import_groups(&self, groups: Vec<Group>) -> PickerResult<Committed<usize>> {
        self.commit(|r| Ok(r.merge_groups(groups))).await
    }

    // ---- picks ----

    async fn record(&self, item: HistoryItem) -> bool {
        if !self.config.record_history {
            return true;
        }
        let evicted = self.history.write().append(item);
        if evicted > 0 {
            debug!(evicted, "History over capacity, evicted oldest items");
        }
        self.save_history().await
    }

    /// Pick one active student and record the pick
    pub async fn pick_student(&self, weighted: bool) -> Committed<Option<Student>> {
        let picked = {
            let roster = self.roster.read();
            let pick = if weighted {
                selector::pick_weighted(&roster.students)
            } else {
                selector::pick_uniform(&roster.students)
            };
            pick.cloned()
        };

        let persisted = match &picked {
            Some(student) => self.record(HistoryItem::for_student(student)).await,
            None => true,
        };
        Committed {
            value: picked,
            persisted,
        }
    }

    /// Pick one active group and record the pick with its member names
    pub async fn pick_group(&self) -> Committed<Option<Group>> {
        let picked = {
            let roster = self.roster.read();
            selector::pick_group(&roster.groups).map(|group| {
                let members = roster.members_of(group.id).unwrap_or_default();
                (group.clone(), members)
            })
        };

        match picked {
            Some((group, members)) => {
                let persisted = self.record(HistoryItem::for_group(&group, &members)).await;
                Committed {
                    value: Some(group),
                    persisted,
                }
            }
            None => Committed {
                value: None,
                persisted: true,
            },
        }
    }

    /// Replace all groups with a balanced random partition of active students
    ///
    /// Destructive: existing groups, names and descriptions are discarded.
    pub async fn partition(&self, group_count: usize) -> PickerResult<Committed<Vec<Group>>> {
        self.commit(|r| {
            let groups = selector::partition_balanced(&r.students, group_count)?;
            r.replace_groups(groups.clone())?;
            info!(groups = group_count, "Replaced groups with a balanced partition");
            Ok(groups)
        })
        .await
    }

    // ---- history ----

    pub fn history(&self) -> Vec<HistoryItem> {
        self.history.read().to_vec()
    }

    pub fn filter_history(&self, filter: &HistoryFilter) -> Vec<HistoryItem> {
        self.history.read().filter(filter)
    }

    /// The configured number of most recent picks
    pub fn recent_history(&self) -> Vec<HistoryItem> {
        self.history.read().recent(self.config.recent_history_count)
    }

    pub fn statistics(&self) -> Vec<(String, usize)> {
        self.history.read().ranked_statistics()
    }

    pub async fn clear_history(&self) -> bool {
        self.history.write().clear();
        self.save_history().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PickerError;
    use crate::types::SelectionMode;
    use tempfile::TempDir;

    async fn open(dir: &TempDir) -> Store {
        Store::open(PickerConfig::new(dir.path())).await
    }

    #[tokio::test]
    async fn test_open_creates_empty_documents() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).await;

        assert!(store.snapshot().is_empty());
        assert!(store.history().is_empty());
        assert!(temp_dir.path().join("students.json").exists());
        assert!(temp_dir.path().join("history.json").exists());
    }

    #[tokio::test]
    async fn test_open_removes_leftover_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("students.json.tmp"), "partial").unwrap();

        open(&temp_dir).await;
        assert!(!temp_dir.path().join("students.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_commands_persist() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = open(&temp_dir).await;
            let ada = store.add_student("Ada", 3, true, None).await.unwrap();
            assert!(ada.persisted);
            assert_eq!(ada.value.id, 1);

            let group = store.add_group("Red", "front row").await.unwrap().into_inner();
            store.add_member(group.id, ada.value.id).await.unwrap();
        }

        let store = open(&temp_dir).await;
        let roster = store.snapshot();
        assert_eq!(roster.students, vec![Student::new(1, "Ada").with_weight(3)]);
        assert_eq!(roster.groups[0].student_ids, vec![1]);
        assert_eq!(store.next_student_id(), 2);
        assert_eq!(store.next_group_id(), 2);
    }

    #[tokio::test]
    async fn test_rejected_command_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).await;
        store.add_group("Red", "").await.unwrap();

        let result = store.add_group("Red", "again").await;
        assert!(matches!(result, Err(PickerError::Validation(_))));

        let result = store.set_group_members(1, &[42]).await;
        assert!(matches!(result, Err(PickerError::NotFound { .. })));
        assert_eq!(store.groups().len(), 1);
        assert!(store.groups()[0].student_ids.is_empty());
    }

    #[tokio::test]
    async fn test_delete_student_cascades_in_one_save() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = open(&temp_dir).await;
            store.add_student("Ada", 1, true, None).await.unwrap();
            store.add_student("Bo", 1, true, None).await.unwrap();
            store.add_group("Red", "").await.unwrap();
            store.set_group_members(1, &[1, 2]).await.unwrap();

            let deleted = store.delete_student(1).await.unwrap();
            assert!(deleted.value);
            assert!(!store.delete_student(1).await.unwrap().value);
        }

        let store = open(&temp_dir).await;
        assert_eq!(store.groups()[0].student_ids, vec![2]);
        assert!(store.read(|r| r.dangling_member_ids()).is_empty());
    }

    #[tokio::test]
    async fn test_pick_records_history() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).await;

        let empty = store.pick_student(false).await;
        assert_eq!(empty.value, None);
        assert!(store.history().is_empty());

        store.add_student("Ada", 2, true, None).await.unwrap();
        let picked = store.pick_student(true).await;
        assert_eq!(picked.value.map(|s| s.id), Some(1));
        assert!(picked.persisted);

        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].selected_name, "Ada");
        assert_eq!(history[0].details, "ID: 1, Weight: 2");

        store.reload().await;
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.statistics(), vec![("Ada".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_pick_group_lists_members() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).await;
        store.add_student("Ada", 1, true, None).await.unwrap();
        store.add_student("Bo", 1, true, None).await.unwrap();
        store.add_group("Red", "").await.unwrap();
        store.set_group_members(1, &[2, 1]).await.unwrap();

        let picked = store.pick_group().await;
        assert_eq!(picked.value.map(|g| g.name), Some("Red".to_string()));

        let item = &store.history()[0];
        assert_eq!(item.mode, SelectionMode::Group);
        assert_eq!(item.details, "Members: Bo, Ada");
    }

    #[tokio::test]
    async fn test_record_history_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let config = PickerConfig {
            record_history: false,
            ..PickerConfig::new(temp_dir.path())
        };
        let store = Store::open(config).await;
        store.add_student("Ada", 1, true, None).await.unwrap();

        assert!(store.pick_student(false).await.value.is_some());
        assert!(store.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_capacity_applies_on_load() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = open(&temp_dir).await;
            store.add_student("Ada", 1, true, None).await.unwrap();
            for _ in 0..5 {
                store.pick_student(false).await;
            }
        }

        let config = PickerConfig {
            history_capacity: 3,
            ..PickerConfig::new(temp_dir.path())
        };
        let store = Store::open(config).await;
        assert_eq!(store.history().len(), 3);
    }

    #[tokio::test]
    async fn test_partition_replaces_groups() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).await;
        for name in ["A", "B", "C", "D", "E", "F", "G"] {
            store.add_student(name, 1, true, None).await.unwrap();
        }
        store.add_group("Old", "gone after partition").await.unwrap();

        let groups = store.partition(3).await.unwrap().into_inner();
        let mut sizes: Vec<usize> = groups.iter().map(Group::member_count).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 2, 3]);
        assert_eq!(store.groups(), groups);
        assert!(store.read(|r| r.group_by_name("Old").is_none()));

        let result = store.partition(8).await;
        assert!(matches!(result, Err(PickerError::InvalidArgument(_))));
        assert_eq!(store.groups(), groups);
    }

    #[tokio::test]
    async fn test_clear_history() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).await;
        store.add_student("Ada", 1, true, None).await.unwrap();
        store.pick_student(false).await;

        assert!(store.clear_history().await);
        store.reload().await;
        assert!(store.history().is_empty());
    }
}

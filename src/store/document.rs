//! Persisted documents
//!
//! The roster (`{"students": [...], "groups": [...]}`) and the history log
//! (a JSON array, most recent first) are independent files. Both follow the
//! same fail-soft contract: loads never fail, saves report `false` instead
//! of returning an error, and every write replaces the file atomically.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::types::{Group, HistoryItem, Roster, Student};
use crate::utils::{atomic_write_async, preserve_corrupt};

/// Outcome of reading a document from disk
enum ReadOutcome<T> {
    Loaded(T),
    Missing,
    Corrupt,
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> ReadOutcome<T> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ReadOutcome::Missing,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read document");
            return ReadOutcome::Corrupt;
        }
    };

    match serde_json::from_str::<T>(&content) {
        Ok(value) => ReadOutcome::Loaded(value),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to parse document");
            match preserve_corrupt(path).await {
                Ok(Some(backup)) => {
                    warn!(backup = %backup.display(), "Unreadable document moved aside")
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Could not move unreadable document aside"),
            }
            ReadOutcome::Corrupt
        }
    }
}

async fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> bool {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to serialize document");
            return false;
        }
    };

    match atomic_write_async(path, json.as_bytes()).await {
        Ok(()) => true,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to save document");
            false
        }
    }
}

/// The roster document on disk
#[derive(Debug, Clone)]
pub struct RosterFile {
    path: PathBuf,
}

impl RosterFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load students and groups
    ///
    /// A missing file is created empty; an unreadable one yields empty
    /// collections. Records that break the roster invariants are dropped
    /// and the repaired document is written back.
    pub async fn load(&self) -> (Vec<Student>, Vec<Group>) {
        match read_document::<Roster>(&self.path).await {
            ReadOutcome::Loaded(mut roster) => {
                let repairs = roster.repair();
                if repairs > 0 {
                    warn!(path = %self.path.display(), repairs, "Roster document repaired");
                    self.save(&roster.students, &roster.groups).await;
                }
                info!(
                    students = roster.student_count(),
                    groups = roster.group_count(),
                    "Loaded roster"
                );
                roster.into_parts()
            }
            ReadOutcome::Missing => {
                warn!(path = %self.path.display(), "Roster file not found, creating an empty one");
                self.save(&[], &[]).await;
                (Vec::new(), Vec::new())
            }
            ReadOutcome::Corrupt => (Vec::new(), Vec::new()),
        }
    }

    /// Write both collections as one document
    pub async fn save(&self, students: &[Student], groups: &[Group]) -> bool {
        #[derive(Serialize)]
        struct RosterRef<'a> {
            students: &'a [Student],
            groups: &'a [Group],
        }

        let saved = write_document(&self.path, &RosterRef { students, groups }).await;
        if saved {
            info!(
                students = students.len(),
                groups = groups.len(),
                "Saved roster"
            );
        }
        saved
    }
}

/// The history document on disk
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load history items, most recent first
    pub async fn load(&self) -> Vec<HistoryItem> {
        match read_document::<Vec<HistoryItem>>(&self.path).await {
            ReadOutcome::Loaded(items) => {
                info!(items = items.len(), "Loaded history");
                items
            }
            ReadOutcome::Missing => {
                self.save(&[]).await;
                Vec::new()
            }
            ReadOutcome::Corrupt => Vec::new(),
        }
    }

    pub async fn save(&self, items: &[HistoryItem]) -> bool {
        write_document(&self.path, items).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_roster_is_created_empty() {
        let temp_dir = TempDir::new().unwrap();
        let file = RosterFile::new(temp_dir.path().join("students.json"));

        let (students, groups) = file.load().await;
        assert!(students.is_empty());
        assert!(groups.is_empty());

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"students": [], "groups": []}));
    }

    #[tokio::test]
    async fn test_corrupt_roster_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("students.json");
        fs::write(&path, "{\"students\": [ {\"id\": ").unwrap();

        let (students, groups) = RosterFile::new(&path).load().await;
        assert!(students.is_empty());
        assert!(groups.is_empty());
        assert!(temp_dir.path().join("students.json.corrupt").exists());
    }

    #[tokio::test]
    async fn test_roster_document_missing_groups_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("students.json");
        fs::write(&path, r#"{"students": [{"id": 1, "name": "Ada", "weight": 2, "active": true}]}"#)
            .unwrap();

        let (students, groups) = RosterFile::new(&path).load().await;
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].weight, 2);
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn test_save_fails_soft_on_unwritable_path() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let file = RosterFile::new(blocker.join("students.json"));
        assert!(!file.save(&[Student::new(1, "Ada")], &[]).await);
    }

    #[tokio::test]
    async fn test_history_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let file = HistoryFile::new(temp_dir.path().join("history.json"));
        let items = vec![
            HistoryItem::for_student(&Student::new(2, "Bo")),
            HistoryItem::for_student(&Student::new(1, "Ada")),
        ];

        assert!(file.save(&items).await);
        assert_eq!(file.load().await, items);
    }

    #[tokio::test]
    async fn test_corrupt_history_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.json");
        fs::write(&path, "not json at all").unwrap();

        assert!(HistoryFile::new(&path).load().await.is_empty());
    }
}

//! Export of roster and history snapshots

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::config::ExportSettings;
use crate::error::{PickerError, PickerResult};
use crate::types::{Group, HistoryItem, SelectionMode, Student};
use crate::utils::{atomic_write_async, export_stamp};

use super::format::{ExportFormat, ExportKind};

pub const STUDENT_HEADER: [&str; 5] = ["Weight", "Name", "ID", "Active", "AvatarPath"];
pub const GROUP_HEADER: [&str; 3] = ["Group Name", "Student Count", "Students"];
pub const HISTORY_HEADER: [&str; 4] = ["Mode", "Selected Name", "Selection Time", "Details"];

/// Point-in-time copy of everything an export can contain
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportSnapshot {
    pub students: Vec<Student>,
    pub groups: Vec<Group>,
    pub history: Vec<HistoryItem>,
}

/// Renders snapshots and writes them under the configured export directory
#[derive(Debug, Clone)]
pub struct Exporter {
    settings: ExportSettings,
}

fn csv_bytes(rows: Vec<Vec<String>>, header: Option<&[&str]>) -> PickerResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if let Some(header) = header {
        writer.write_record(header)?;
    }
    for row in rows {
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|e| PickerError::Io(e.into_error()))
}

impl Exporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    fn header<'h>(&self, header: &'h [&'h str]) -> Option<&'h [&'h str]> {
        self.settings.include_header.then_some(header)
    }

    pub fn students_csv(&self, students: &[Student]) -> PickerResult<Vec<u8>> {
        let rows = students
            .iter()
            .map(|s| {
                vec![
                    s.weight.to_string(),
                    s.name.clone(),
                    s.id.to_string(),
                    s.active.to_string(),
                    s.avatar_path.clone().unwrap_or_default(),
                ]
            })
            .collect();
        csv_bytes(rows, self.header(&STUDENT_HEADER))
    }

    /// Members are written by name, joined with `;`
    pub fn groups_csv(&self, groups: &[Group], students: &[Student]) -> PickerResult<Vec<u8>> {
        let names: HashMap<u32, &str> = students.iter().map(|s| (s.id, s.name.as_str())).collect();
        let rows = groups
            .iter()
            .map(|g| {
                let members: Vec<&str> = g
                    .student_ids
                    .iter()
                    .filter_map(|id| names.get(id).copied())
                    .collect();
                vec![g.name.clone(), members.len().to_string(), members.join(";")]
            })
            .collect();
        csv_bytes(rows, self.header(&GROUP_HEADER))
    }

    pub fn history_csv(&self, history: &[HistoryItem]) -> PickerResult<Vec<u8>> {
        let rows = history
            .iter()
            .map(|h| {
                let mode = match h.mode {
                    SelectionMode::Individual => "Individual",
                    SelectionMode::Group => "Group",
                };
                vec![
                    mode.to_string(),
                    h.selected_name.clone(),
                    h.formatted_time(),
                    h.details.clone(),
                ]
            })
            .collect();
        csv_bytes(rows, self.header(&HISTORY_HEADER))
    }

    fn json(&self, snapshot: &ExportSnapshot, kind: ExportKind) -> PickerResult<Vec<u8>> {
        let bytes = match kind {
            ExportKind::Students => serde_json::to_vec_pretty(&snapshot.students)?,
            ExportKind::Groups => serde_json::to_vec_pretty(&snapshot.groups)?,
            ExportKind::History => serde_json::to_vec_pretty(&snapshot.history)?,
            ExportKind::All => serde_json::to_vec_pretty(snapshot)?,
        };
        Ok(bytes)
    }

    /// Render one dataset into file content
    ///
    /// `ExportKind::All` renders only as JSON; tabular formats write one file
    /// per dataset through [`Exporter::export`].
    pub fn render(
        &self,
        snapshot: &ExportSnapshot,
        kind: ExportKind,
        format: ExportFormat,
    ) -> PickerResult<Vec<u8>> {
        match format {
            ExportFormat::Pdf => Err(PickerError::Unsupported(
                "PDF rendering is provided by the presentation layer".into(),
            )),
            ExportFormat::Json => self.json(snapshot, kind),
            ExportFormat::Excel | ExportFormat::Csv => match kind {
                ExportKind::Students => self.students_csv(&snapshot.students),
                ExportKind::Groups => self.groups_csv(&snapshot.groups, &snapshot.students),
                ExportKind::History => self.history_csv(&snapshot.history),
                ExportKind::All => Err(PickerError::InvalidArgument(
                    "a tabular export covers one dataset at a time".into(),
                )),
            },
        }
    }

    /// `{prefix}_{kind}[_{timestamp}].{ext}`
    pub fn file_name(&self, kind: ExportKind, format: ExportFormat, now: &DateTime<Local>) -> String {
        let mut name = format!("{}_{}", self.settings.file_name_prefix, kind.label());
        if self.settings.include_timestamp {
            name.push('_');
            name.push_str(&export_stamp(now));
        }
        format!("{}.{}", name, format.extension())
    }

    /// Write the export and return the files created
    pub async fn export(
        &self,
        snapshot: &ExportSnapshot,
        kind: ExportKind,
        format: ExportFormat,
    ) -> PickerResult<Vec<PathBuf>> {
        let now = Local::now();
        let kinds: Vec<ExportKind> = if kind == ExportKind::All && format.is_tabular() {
            vec![ExportKind::Students, ExportKind::Groups, ExportKind::History]
        } else {
            vec![kind]
        };

        let mut written = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let content = self.render(snapshot, kind, format)?;
            let path = self.settings.export_dir.join(self.file_name(kind, format, &now));
            atomic_write_async(&path, &content).await?;
            info!(path = %path.display(), format = %format, "Exported {}", kind.label());
            written.push(path);
        }
        Ok(written)
    }
}

//! Import of tabular (CSV) student and group lists
//!
//! Spreadsheets are expected to be saved as CSV first. The first row is
//! treated as a header when one of its cells is exactly a known column
//! label (ASCII case ignored).

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use crate::error::PickerResult;
use crate::types::{clamp_weight, default_weight, Group, Student};

const STUDENT_LABELS: &[&str] = &[
    "Weight", "Name", "ID", "Active", "AvatarPath", "权重", "姓名", "学号", "启用状态", "头像路径",
];
const GROUP_LABELS: &[&str] = &[
    "Group Name", "Student Count", "Students", "分组名称", "学生数量", "学生列表",
];

/// Parsed rows plus the number of rows that were dropped
#[derive(Debug, Clone, PartialEq)]
pub struct Imported<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

fn read_rows<R: Read>(reader: R) -> Vec<Option<Vec<String>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .records()
        .map(|record| match record {
            Ok(record) => Some(record.iter().map(str::to_string).collect()),
            Err(e) => {
                warn!(error = %e, "Unreadable import row");
                None
            }
        })
        .collect()
}

fn looks_like_header(row: &[String], labels: &[&str]) -> bool {
    row.iter()
        .any(|cell| labels.iter().any(|label| cell.eq_ignore_ascii_case(label)))
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.is_empty())
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "y" => Some(true),
        "false" | "no" | "0" | "n" => Some(false),
        _ => None,
    }
}

/// Map one row onto a student by its column count
///
/// * 4+ columns: weight, name, id, active[, avatar]
/// * 3 columns: name, id, weight
/// * 2 columns: name, id
fn student_from_row(row: &[String]) -> Option<Student> {
    let (name, id, weight, active, avatar) = match row.len() {
        0 | 1 => return None,
        2 => (&row[0], &row[1], None, None, None),
        3 => (&row[0], &row[1], Some(&row[2]), None, None),
        _ => (&row[1], &row[2], Some(&row[0]), Some(&row[3]), row.get(4)),
    };

    let id: u32 = id.parse().ok().filter(|&id| id > 0)?;
    if name.is_empty() {
        return None;
    }

    let weight = weight
        .and_then(|w| w.parse::<i32>().ok())
        .unwrap_or_else(default_weight);

    Some(Student {
        id,
        name: name.clone(),
        weight: clamp_weight(weight),
        active: active.and_then(|a| parse_bool(a)).unwrap_or(true),
        avatar_path: avatar.filter(|a| !a.is_empty()).cloned(),
    })
}

/// Parse a student list; rows are de-duplicated by id, first one wins
pub fn import_students<R: Read>(reader: R) -> Imported<Student> {
    let rows = read_rows(reader);
    let mut skipped = 0;
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let Some(row) = row else {
            skipped += 1;
            continue;
        };
        if is_blank(&row) || (index == 0 && looks_like_header(&row, STUDENT_LABELS)) {
            continue;
        }

        match student_from_row(&row) {
            Some(student) if seen.insert(student.id) => items.push(student),
            Some(student) => {
                warn!(id = student.id, "Duplicate student id in import, keeping the first");
                skipped += 1;
            }
            None => skipped += 1,
        }
    }

    info!(imported = items.len(), skipped, "Parsed student import");
    Imported { items, skipped }
}

pub fn import_students_from_path<P: AsRef<Path>>(path: P) -> PickerResult<Imported<Student>> {
    Ok(import_students(File::open(path)?))
}

/// Parse a group list: `name, count[, member;member;...]`
///
/// Members are matched to `students` by exact name; unknown names are
/// dropped. The returned groups carry id `0` until merged into a roster.
pub fn import_groups<R: Read>(reader: R, students: &[Student]) -> Imported<Group> {
    let by_name: HashMap<&str, u32> = students.iter().map(|s| (s.name.as_str(), s.id)).collect();
    let rows = read_rows(reader);
    let mut skipped = 0;
    let mut items = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let Some(row) = row else {
            skipped += 1;
            continue;
        };
        if is_blank(&row) || (index == 0 && looks_like_header(&row, GROUP_LABELS)) {
            continue;
        }
        if row.len() < 2 || row[0].is_empty() {
            skipped += 1;
            continue;
        }

        let members = row
            .get(2)
            .map(|list| {
                list.split(';')
                    .map(str::trim)
                    .filter_map(|name| by_name.get(name).copied())
                    .collect()
            })
            .unwrap_or_default();
        items.push(Group::new(0, row[0].clone()).with_members(members));
    }

    info!(imported = items.len(), skipped, "Parsed group import");
    Imported { items, skipped }
}

pub fn import_groups_from_path<P: AsRef<Path>>(
    path: P,
    students: &[Student],
) -> PickerResult<Imported<Group>> {
    Ok(import_groups(File::open(path)?, students))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportSettings;
    use crate::transfer::Exporter;

    #[test]
    fn test_header_is_detected_and_skipped() {
        let csv = "Weight,Name,ID,Active\n2,Ada,1,true\n1,Bo,2,False\n";
        let imported = import_students(csv.as_bytes());
        assert_eq!(imported.items.len(), 2);
        assert_eq!(imported.items[0], Student::new(1, "Ada").with_weight(2));
        assert!(!imported.items[1].active);
    }

    #[test]
    fn test_chinese_header_is_detected() {
        let csv = "姓名,学号\n张三,1001\n";
        let imported = import_students(csv.as_bytes());
        assert_eq!(imported.items, vec![Student::new(1001, "张三")]);
    }

    #[test]
    fn test_layout_follows_column_count() {
        let csv = "Ada,1\nBo,2,7\n5,Cy,3,true,cy.png\n";
        let students = import_students(csv.as_bytes()).items;
        assert_eq!(students[0], Student::new(1, "Ada"));
        assert_eq!(students[1], Student::new(2, "Bo").with_weight(7));
        assert_eq!(students[2].weight, 5);
        assert_eq!(students[2].avatar_path.as_deref(), Some("cy.png"));
    }

    #[test]
    fn test_invalid_rows_are_skipped() {
        let csv = "Ada,0\n,5\nBo,abc\nlonely\n\nCy,3,500\n";
        let imported = import_students(csv.as_bytes());
        assert_eq!(imported.items, vec![Student::new(3, "Cy").with_weight(100)]);
        assert_eq!(imported.skipped, 4);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let csv = "Ada,1\nImposter,1\nBo,2\n";
        let imported = import_students(csv.as_bytes());
        let names: Vec<&str> = imported.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Bo"]);
        assert_eq!(imported.skipped, 1);
    }

    #[test]
    fn test_export_then_import_students() {
        let mut ada = Student::new(1, "Ada, L.").with_weight(4);
        ada.avatar_path = Some("a.png".into());
        let students = vec![ada, Student::new(2, "Bo").with_active(false)];

        let bytes = Exporter::new(ExportSettings::default())
            .students_csv(&students)
            .unwrap();
        assert_eq!(import_students(bytes.as_slice()).items, students);
    }

    #[test]
    fn test_import_groups_resolves_names() {
        let students = vec![Student::new(1, "Ada"), Student::new(2, "Bo")];
        let csv = "Group Name,Student Count,Students\nRed,2,Ada;Bo\nBlue,1,Ghost\nGreen,0\n,3,Ada\n";
        let imported = import_groups(csv.as_bytes(), &students);

        assert_eq!(imported.items.len(), 3);
        assert_eq!(imported.items[0].name, "Red");
        assert_eq!(imported.items[0].student_ids, vec![1, 2]);
        assert!(imported.items[1].student_ids.is_empty());
        assert_eq!(imported.items[2].name, "Green");
        assert_eq!(imported.skipped, 1);
    }

    #[test]
    fn test_first_row_is_data_unless_a_cell_is_a_label() {
        let students = vec![Student::new(1, "Ada"), Student::new(2, "Bo")];
        let imported = import_groups("Group 1,2,Ada;Bo\nGroup 2,0\n".as_bytes(), &students);
        let names: Vec<&str> = imported.items.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Group 1", "Group 2"]);
        assert_eq!(imported.items[0].student_ids, vec![1, 2]);

        let imported = import_students("Nameless,4\nIdris,5\n".as_bytes());
        assert_eq!(imported.items.len(), 2);

        let imported = import_students("name,id\nAda,1\n".as_bytes());
        assert_eq!(imported.items, vec![Student::new(1, "Ada")]);
    }
}

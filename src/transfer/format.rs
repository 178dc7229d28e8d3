//! Export format tags

use serde::{Deserialize, Serialize};

use crate::error::PickerError;

/// Target format for an export
///
/// `Excel` produces CSV content, which spreadsheet applications open
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Excel,
    Csv,
    Pdf,
    Json,
}

impl ExportFormat {
    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Excel | ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Json => "json",
        }
    }

    pub fn is_tabular(&self) -> bool {
        matches!(self, ExportFormat::Excel | ExportFormat::Csv)
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excel" | "xlsx" | "xls" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            "json" => Ok(ExportFormat::Json),
            other => Err(PickerError::InvalidArgument(format!(
                "unknown export format '{}'",
                other
            ))),
        }
    }
}

/// Which dataset an export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    Students,
    Groups,
    History,
    /// Everything; one JSON document, or one tabular file per dataset
    All,
}

impl ExportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::Students => "students",
            ExportKind::Groups => "groups",
            ExportKind::History => "history",
            ExportKind::All => "all",
        }
    }
}

impl std::str::FromStr for ExportKind {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "students" | "student" => Ok(ExportKind::Students),
            "groups" | "group" => Ok(ExportKind::Groups),
            "history" => Ok(ExportKind::History),
            "all" => Ok(ExportKind::All),
            other => Err(PickerError::InvalidArgument(format!(
                "unknown export kind '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_tags() {
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("Pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_excel_writes_csv() {
        assert_eq!(ExportFormat::Excel.extension(), "csv");
        assert!(ExportFormat::Excel.is_tabular());
        assert!(!ExportFormat::Json.is_tabular());
    }
}

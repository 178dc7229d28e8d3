//! History queries

use chrono::NaiveDate;

use crate::types::{HistoryItem, SelectionMode};
use crate::utils::{end_of_day, start_of_day};

/// Conjunctive filter over history items; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Case-insensitive substring of `selectedName` or `details`
    pub search_text: Option<String>,
    /// Inclusive from the start of this day
    pub start_date: Option<NaiveDate>,
    /// Inclusive through the last second of this day
    pub end_date: Option<NaiveDate>,
    pub mode: Option<SelectionMode>,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn since(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn until(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn mode(mut self, mode: SelectionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Whether the filter would pass every item
    pub fn is_empty(&self) -> bool {
        self.needle().is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.mode.is_none()
    }

    fn needle(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    /// Build a reusable predicate
    pub fn matcher(&self) -> impl Fn(&HistoryItem) -> bool + '_ {
        let needle = self.needle();
        let start = self.start_date.map(start_of_day);
        let end = self.end_date.map(end_of_day);

        move |item: &HistoryItem| {
            if let Some(needle) = &needle {
                let hit = item.selected_name.to_lowercase().contains(needle)
                    || item.details.to_lowercase().contains(needle);
                if !hit {
                    return false;
                }
            }

            let local = item.selection_time.naive_local();
            if start.is_some_and(|start| local < start) {
                return false;
            }
            if end.is_some_and(|end| local > end) {
                return false;
            }

            self.mode.map_or(true, |mode| item.mode == mode)
        }
    }
}
